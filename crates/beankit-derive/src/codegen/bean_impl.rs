//! `Bean`, `BeanClass` and `Identified` code generation.

use crate::parse::{BeanInput, FieldInput};
use proc_macro2::TokenStream;
use quote::quote;

/// Generate the trait implementations for a bean struct.
pub fn generate(input: &BeanInput) -> syn::Result<TokenStream> {
    let struct_name = &input.ident;
    let type_name = input.type_name();
    let fields = input.properties();

    let descriptors = fields.iter().map(|f| generate_descriptor(f));
    let get_arms = fields.iter().map(|f| generate_get_arm(f));
    let set_arms = fields.iter().map(|f| generate_set_arm(f));
    let raw_get_arms = fields.iter().map(|f| generate_raw_get_arm(f));
    let raw_set_arms = fields.iter().map(|f| generate_raw_set_arm(f));
    let identified = generate_identified(input);

    Ok(quote! {
        impl ::beankit::BeanClass for #struct_name {
            const TYPE_NAME: &'static str = #type_name;

            fn properties() -> ::std::vec::Vec<::beankit::PropertyDescriptor> {
                ::std::vec![#(#descriptors),*]
            }
        }

        impl ::beankit::Bean for #struct_name {
            fn type_name(&self) -> &'static str {
                #type_name
            }

            fn shape(&self) -> ::std::sync::Arc<::beankit::Shape> {
                ::beankit::describe::<Self>()
            }

            fn get(&self, name: &str) -> ::beankit::AccessResult<::beankit::Value> {
                match name {
                    #(#get_arms)*
                    _ => ::std::result::Result::Err(
                        ::beankit::PropertyAccessError::unknown_property(#type_name, name),
                    ),
                }
            }

            #[allow(unused_variables)]
            fn set(&mut self, name: &str, value: ::beankit::Value) -> ::beankit::AccessResult<()> {
                match name {
                    #(#set_arms)*
                    _ => ::std::result::Result::Err(
                        ::beankit::PropertyAccessError::unknown_property(#type_name, name),
                    ),
                }
            }

            fn get_raw(&self, name: &str) -> ::beankit::AccessResult<::beankit::Value> {
                match name {
                    #(#raw_get_arms)*
                    _ => ::std::result::Result::Err(
                        ::beankit::PropertyAccessError::unknown_property(#type_name, name),
                    ),
                }
            }

            #[allow(unused_variables)]
            fn set_raw(&mut self, name: &str, value: ::beankit::Value) -> ::beankit::AccessResult<()> {
                match name {
                    #(#raw_set_arms)*
                    _ => ::std::result::Result::Err(
                        ::beankit::PropertyAccessError::unknown_property(#type_name, name),
                    ),
                }
            }

            fn new_default(&self) -> ::std::boxed::Box<dyn ::beankit::Bean> {
                ::std::boxed::Box::new(<Self as ::std::default::Default>::default())
            }

            fn share(self: ::std::boxed::Box<Self>) -> ::beankit::BeanRef {
                ::beankit::Shared::new(*self).to_bean_ref()
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
                self
            }
        }

        #identified
    })
}

fn generate_descriptor(field: &FieldInput) -> TokenStream {
    let name = field.property_name();
    let ty = &field.ty;
    let readable = field.is_readable();
    let writable = field.is_writable();
    quote! {
        ::beankit::PropertyDescriptor::new(
            #name,
            <#ty as ::beankit::PropertyValue>::value_type(),
            #readable,
            #writable,
        )
    }
}

fn generate_get_arm(field: &FieldInput) -> TokenStream {
    let name = field.property_name();
    if field.is_readable() {
        generate_raw_get_arm(field)
    } else {
        quote! {
            #name => ::std::result::Result::Err(
                ::beankit::PropertyAccessError::not_readable(
                    <Self as ::beankit::BeanClass>::TYPE_NAME,
                    name,
                ),
            ),
        }
    }
}

fn generate_set_arm(field: &FieldInput) -> TokenStream {
    let name = field.property_name();
    if field.is_writable() {
        generate_raw_set_arm(field)
    } else {
        quote! {
            #name => ::std::result::Result::Err(
                ::beankit::PropertyAccessError::not_writable(
                    <Self as ::beankit::BeanClass>::TYPE_NAME,
                    name,
                ),
            ),
        }
    }
}

fn generate_raw_get_arm(field: &FieldInput) -> TokenStream {
    let name = field.property_name();
    let ident = field.ident();
    quote! {
        #name => ::std::result::Result::Ok(::beankit::PropertyValue::to_value(&self.#ident)),
    }
}

fn generate_raw_set_arm(field: &FieldInput) -> TokenStream {
    let name = field.property_name();
    let ident = field.ident();
    let ty = &field.ty;
    quote! {
        #name => {
            self.#ident = <#ty as ::beankit::PropertyValue>::from_value(value).map_err(|e| {
                ::beankit::PropertyAccessError::conversion(
                    <Self as ::beankit::BeanClass>::TYPE_NAME,
                    name,
                    e,
                )
            })?;
            ::std::result::Result::Ok(())
        }
    }
}

fn generate_identified(input: &BeanInput) -> TokenStream {
    let Some(field) = input.fields().into_iter().find(|f| f.id) else {
        return TokenStream::new();
    };
    let struct_name = &input.ident;
    let ident = field.ident();
    let ty = &field.ty;
    quote! {
        impl ::beankit::Identified for #struct_name {
            type Id = #ty;

            fn id(&self) -> Self::Id {
                ::std::clone::Clone::clone(&self.#ident)
            }

            fn set_id(&mut self, id: Self::Id) {
                self.#ident = id;
            }
        }
    }
}
