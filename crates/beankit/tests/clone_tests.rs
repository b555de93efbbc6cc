//! Integration tests for shallow and deep cloning.
#![allow(missing_docs)]

mod common;

use beankit::{
    deep_clone, deep_clone_shared, deep_clone_value, shallow_clone, CloneError, GraphCloner,
    Resource, Shared, Value,
};
use common::*;

#[test]
fn test_shallow_clone_shares_nested() {
    let original = customer();
    let copy = shallow_clone(&original).unwrap();

    assert_eq!(copy.name, original.name);
    assert_eq!(copy.tags, original.tags);
    let (a, b) = (original.address.unwrap(), copy.address.unwrap());
    assert!(a.ptr_eq(&b));
}

#[test]
fn test_shallow_clone_leaves_skipped_and_read_only_fields() {
    let original = customer();
    let copy = shallow_clone(&original).unwrap();
    assert!(!copy.dirty);
    assert_eq!(copy.version, 0);
    // write-only fields cannot be read back
    assert_eq!(copy.password, "");
}

#[test]
fn test_deep_clone_duplicates_nested() {
    let original = customer();
    let copy = deep_clone(&original).unwrap();

    let (a, b) = (original.address.unwrap(), copy.address.unwrap());
    assert!(!a.ptr_eq(&b));
    assert_eq!(*a.read(), *b.read());

    b.write().city = "Madrid".to_string();
    assert_eq!(a.read().city, "Berlin");
}

#[test]
fn test_deep_clone_carries_every_property() {
    let original = customer();
    let copy = deep_clone(&original).unwrap();

    assert_eq!(copy.version, 3);
    assert_eq!(copy.password, "secret");
    // skipped fields are not properties
    assert!(!copy.dirty);

    let expected = Customer {
        dirty: false,
        ..original
    };
    assert_eq!(copy, expected);
}

#[test]
fn test_deep_clone_keeps_shared_structure() {
    let shared = node("shared");
    let root = Node {
        label: "root".to_string(),
        next: Some(shared.clone()),
        children: vec![shared.clone(), node("other")],
    };

    let copy = deep_clone(&root).unwrap();
    let next = copy.next.clone().unwrap();
    assert!(!next.ptr_eq(&shared));
    assert!(next.ptr_eq(&copy.children[0]));
    assert!(!next.ptr_eq(&copy.children[1]));
    assert_eq!(copy.children[1].read().label, "other");
}

#[test]
fn test_deep_clone_preserves_cycle() {
    let a = node("a");
    let b = node("b");
    a.write().next = Some(b.clone());
    b.write().next = Some(a.clone());

    let a2 = deep_clone_shared(&a).unwrap();
    assert!(!a2.ptr_eq(&a));
    assert_eq!(a2.read().label, "a");

    let b2 = a2.read().next.clone().unwrap();
    assert!(!b2.ptr_eq(&b));
    assert_eq!(b2.read().label, "b");

    let back = b2.read().next.clone().unwrap();
    assert!(back.ptr_eq(&a2));

    // break the cycles so the test does not leak
    a.write().next = None;
    a2.write().next = None;
}

#[test]
fn test_cyclic_graph_equals_its_deep_clone() {
    let a = ring("a");
    a.write().next = Some(a.clone());
    let a2 = deep_clone_shared(&a).unwrap();
    assert!(!a2.ptr_eq(&a));
    assert_eq!(a, a2);

    let x = ring("x");
    let y = ring("y");
    x.write().next = Some(y.clone());
    y.write().next = Some(x.clone());
    let x2 = deep_clone_shared(&x).unwrap();
    assert_eq!(x, x2);

    let y2 = x2.read().next.clone().unwrap();
    y2.write().label = "z".to_string();
    assert_ne!(x, x2);

    for handle in [&a, &a2, &x, &x2] {
        handle.write().next = None;
    }
}

#[test]
fn test_deep_clone_self_loop() {
    let a = node("self");
    a.write().children.push(a.clone());

    let copy = deep_clone_shared(&a).unwrap();
    let child = copy.read().children[0].clone();
    assert!(child.ptr_eq(&copy));

    a.write().children.clear();
    copy.write().children.clear();
}

#[test]
fn test_deep_clone_fails_on_resource() {
    let session = Session {
        user: "u".to_string(),
        conn: Some(Resource::new(Connection {
            url: "db://".to_string(),
        })),
    };

    // shallow shares the handle
    let shallow = shallow_clone(&session).unwrap();
    assert!(shallow.conn.as_ref().unwrap().ptr_eq(session.conn.as_ref().unwrap()));

    let err = deep_clone(&session).unwrap_err();
    match err {
        CloneError::Unclonable { bean, property, .. } => {
            assert_eq!(bean, "Session");
            assert_eq!(property, "conn");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_deep_clone_resource_in_nested_bean() {
    #[derive(Debug, Default, beankit::Bean)]
    struct Holder {
        session: Option<Shared<Session>>,
    }

    let holder = Holder {
        session: Some(Shared::new(Session {
            user: "u".to_string(),
            conn: Some(Resource::new(Connection::default())),
        })),
    };
    let err = deep_clone(&holder).unwrap_err();
    assert!(matches!(err, CloneError::Unclonable { bean: "Session", .. }));
}

#[test]
fn test_graph_cloner_links_roots() {
    let shared = address("Lisbon");
    let first = Customer {
        address: Some(shared.clone()),
        ..Default::default()
    };
    let second = Customer {
        address: Some(shared.clone()),
        ..Default::default()
    };

    let mut cloner = GraphCloner::new();
    let a = cloner.clone_bean(&first).unwrap();
    let b = cloner.clone_bean(&second).unwrap();
    assert_eq!(cloner.len(), 1);
    assert!(a.address.unwrap().ptr_eq(&b.address.unwrap()));
}

#[test]
fn test_graph_cloner_forgets_failed_call() {
    #[derive(Debug, Default, beankit::Bean)]
    struct Holder {
        session: Option<Shared<Session>>,
    }

    let session = Shared::new(Session {
        user: "u".to_string(),
        conn: Some(Resource::new(Connection::default())),
    });
    let holder = Holder {
        session: Some(session.clone()),
    };

    let mut cloner = GraphCloner::new();
    assert!(cloner.clone_bean(&holder).is_err());
    assert!(cloner.is_empty());

    session.write().conn = None;
    let copy = cloner.clone_bean(&holder).unwrap();
    let copied = copy.session.unwrap();
    assert!(!copied.ptr_eq(&session));
    assert_eq!(copied.read().user, "u");
    assert_eq!(cloner.len(), 1);
}

#[test]
fn test_deep_clone_value_list_of_beans() {
    let shared = address("Rome");
    let value = Value::List(vec![
        Value::Bean(shared.to_bean_ref()),
        Value::Bean(shared.to_bean_ref()),
    ]);
    let copy = deep_clone_value(&value).unwrap();
    let items = copy.as_list().unwrap();
    let (x, y) = (items[0].as_bean().unwrap(), items[1].as_bean().unwrap());
    assert!(x.ptr_eq(y));
    assert!(!x.ptr_eq(&shared.to_bean_ref()));
    assert_eq!(x.downcast::<Address>().unwrap().read().city, "Rome");
}
