//! Parsing logic for Bean derive macro.

use darling::{ast, FromDeriveInput, FromField};
use syn::{Generics, Ident, Type};

/// Parsed struct-level options.
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(bean), supports(struct_named))]
pub struct BeanInput {
    /// The struct identifier.
    pub ident: Ident,

    /// Generic parameters.
    pub generics: Generics,

    /// Struct data (fields).
    pub data: ast::Data<(), FieldInput>,

    /// Bean type name used in declared types and errors (e.g., `#[bean(rename = "Customer")]`).
    #[darling(default)]
    pub rename: Option<String>,
}

impl BeanInput {
    /// Get the fields as a vector.
    pub fn fields(&self) -> Vec<&FieldInput> {
        self.data
            .as_ref()
            .take_struct()
            .map(|s| s.fields.to_vec())
            .unwrap_or_default()
    }

    /// Fields that become properties.
    pub fn properties(&self) -> Vec<&FieldInput> {
        self.fields().into_iter().filter(|f| f.is_included()).collect()
    }

    /// The bean type name.
    pub fn type_name(&self) -> String {
        self.rename
            .clone()
            .unwrap_or_else(|| self.ident.to_string())
    }
}

/// Parsed field-level options.
#[derive(Debug, FromField)]
#[darling(attributes(bean))]
pub struct FieldInput {
    /// Field identifier.
    pub ident: Option<Ident>,

    /// Field type.
    pub ty: Type,

    /// Property name, if different from the field name.
    #[darling(default)]
    pub rename: Option<String>,

    /// Not a property.
    #[darling(default)]
    pub skip: bool,

    /// Property has no writer.
    #[darling(default)]
    pub read_only: bool,

    /// Property has no reader.
    #[darling(default)]
    pub write_only: bool,

    /// The record's identifier.
    #[darling(default)]
    pub id: bool,
}

impl FieldInput {
    /// Get the field identifier (panics if None).
    pub fn ident(&self) -> &Ident {
        self.ident.as_ref().expect("named field required")
    }

    /// Get the property name for this field.
    pub fn property_name(&self) -> String {
        self.rename
            .clone()
            .unwrap_or_else(|| self.ident().to_string())
    }

    /// Check if this field is a property.
    pub fn is_included(&self) -> bool {
        !self.skip
    }

    pub fn is_readable(&self) -> bool {
        !self.write_only
    }

    pub fn is_writable(&self) -> bool {
        !self.read_only
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use darling::FromDeriveInput;
    use syn::parse_quote;

    #[test]
    fn test_parse_basic_struct() {
        let input: syn::DeriveInput = parse_quote! {
            struct User {
                name: String,
                age: u32,
            }
        };

        let parsed = BeanInput::from_derive_input(&input).unwrap();
        assert_eq!(parsed.ident.to_string(), "User");
        assert_eq!(parsed.type_name(), "User");

        let fields = parsed.fields();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].ident().to_string(), "name");
        assert_eq!(fields[1].ident().to_string(), "age");
        assert!(fields[0].is_readable() && fields[0].is_writable());
    }

    #[test]
    fn test_parse_with_attributes() {
        let input: syn::DeriveInput = parse_quote! {
            #[bean(rename = "Customer")]
            struct User {
                #[bean(id)]
                id: i64,
                #[bean(rename = "user_name")]
                name: String,
                #[bean(skip)]
                cache: String,
                #[bean(read_only)]
                created: String,
                #[bean(write_only)]
                password: String,
            }
        };

        let parsed = BeanInput::from_derive_input(&input).unwrap();
        assert_eq!(parsed.type_name(), "Customer");

        let fields = parsed.fields();
        assert!(fields[0].id);
        assert_eq!(fields[1].property_name(), "user_name");
        assert!(!fields[2].is_included());
        assert!(!fields[3].is_writable());
        assert!(!fields[4].is_readable());
        assert_eq!(parsed.properties().len(), 4);
    }

    #[test]
    fn test_rejects_tuple_struct() {
        let input: syn::DeriveInput = parse_quote! {
            struct Pair(i32, i32);
        };
        assert!(BeanInput::from_derive_input(&input).is_err());
    }
}
