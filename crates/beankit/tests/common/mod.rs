//! Bean models shared by the integration tests.
#![allow(dead_code)]

use beankit::{Bean, Resource, Shared};
use chrono::NaiveDate;
use std::collections::BTreeMap;

#[derive(Debug, Default, Clone, PartialEq, Bean)]
pub struct Address {
    pub city: String,
    pub zip: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Bean)]
pub struct Customer {
    #[bean(id)]
    pub id: i64,
    pub name: String,
    pub age: i32,
    pub address: Option<Shared<Address>>,
    pub tags: Vec<String>,
    pub scores: BTreeMap<String, i32>,
    pub joined: Option<NaiveDate>,
    #[bean(read_only)]
    pub version: u32,
    #[bean(write_only)]
    pub password: String,
    #[bean(skip)]
    pub dirty: bool,
}

/// Loosely typed counterpart of [`Customer`], as filled in from a form.
#[derive(Debug, Default, Clone, PartialEq, Bean)]
pub struct CustomerForm {
    pub name: String,
    pub age: String,
    pub joined: String,
    pub tags: Vec<String>,
    pub address: Option<Shared<Address>>,
}

#[derive(Debug, Default, Clone, PartialEq, Bean)]
pub struct Summary {
    pub title: String,
    pub first_tag: Option<String>,
    pub city: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Bean)]
pub struct Draft {
    pub title: Option<String>,
    pub city: Option<String>,
}

#[derive(Debug, Default, Bean)]
pub struct Node {
    pub label: String,
    pub next: Option<Shared<Node>>,
    pub children: Vec<Shared<Node>>,
}

/// Singly linked node that compares by value, for cyclic graphs.
#[derive(Debug, Default, PartialEq, Bean)]
pub struct Ring {
    pub label: String,
    pub next: Option<Shared<Ring>>,
}

#[derive(Debug, Default)]
pub struct Connection {
    pub url: String,
}

#[derive(Debug, Default, Bean)]
pub struct Session {
    pub user: String,
    pub conn: Option<Resource<Connection>>,
}

pub fn address(city: &str) -> Shared<Address> {
    Shared::new(Address {
        city: city.to_string(),
        zip: None,
    })
}

pub fn customer() -> Customer {
    Customer {
        id: 7,
        name: "Alice".to_string(),
        age: 30,
        address: Some(address("Berlin")),
        tags: vec!["vip".to_string(), "early".to_string()],
        scores: BTreeMap::from([("math".to_string(), 90)]),
        joined: NaiveDate::from_ymd_opt(2024, 1, 15),
        version: 3,
        password: "secret".to_string(),
        dirty: true,
    }
}

pub fn ring(label: &str) -> Shared<Ring> {
    Shared::new(Ring {
        label: label.to_string(),
        next: None,
    })
}

pub fn node(label: &str) -> Shared<Node> {
    Shared::new(Node {
        label: label.to_string(),
        ..Default::default()
    })
}
