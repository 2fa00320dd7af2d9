//! Code generation for the Describe derive macro.

mod describe;
mod record;

use std::collections::HashSet;

use crate::parse::RecordInput;
use darling::FromDeriveInput;
use proc_macro2::TokenStream;
use quote::quote;
use syn::{parse_quote, DeriveInput, Generics};

/// Main entry point for code generation.
pub fn expand(input: &DeriveInput) -> syn::Result<TokenStream> {
    let parsed = RecordInput::from_derive_input(input)
        .map_err(|e| syn::Error::new_spanned(input, e.to_string()))?;

    validate(&parsed)?;

    let generics = bounded_generics(&parsed);
    let describe = describe::generate(&parsed, &generics)?;
    let record = record::generate(&parsed, &generics)?;

    Ok(quote! {
        #describe
        #record
    })
}

fn validate(input: &RecordInput) -> syn::Result<()> {
    let mut state = None;
    let mut names = HashSet::new();

    for field in input.fields() {
        let ident = field.ident()?;

        if field.state {
            if field.rename.is_some() || field.skip || field.omit_empty {
                return Err(syn::Error::new_spanned(
                    ident,
                    "#[lossless(state)] cannot be combined with other field directives",
                ));
            }
            if state.replace(ident).is_some() {
                return Err(syn::Error::new_spanned(
                    ident,
                    "only one field can be marked #[lossless(state)]",
                ));
            }
            continue;
        }

        if field.skip && (field.rename.is_some() || field.omit_empty) {
            return Err(syn::Error::new_spanned(
                ident,
                "#[lossless(skip)] cannot be combined with rename or omit_empty",
            ));
        }

        if field.rename.as_deref() == Some("") {
            return Err(syn::Error::new_spanned(
                ident,
                "#[lossless(rename)] requires a non-empty name",
            ));
        }

        if !field.skip {
            let key = field.json_key()?;
            if !names.insert(key.clone()) {
                return Err(syn::Error::new_spanned(
                    ident,
                    format!("duplicate member name `{key}`"),
                ));
            }
        }
    }

    if input.serde && state.is_none() {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "#[lossless(serde)] requires a field marked #[lossless(state)]",
        ));
    }

    Ok(())
}

/// Generics of the input with serde bounds on every projected field type.
/// Non-generic structs are returned unchanged.
fn bounded_generics(input: &RecordInput) -> Generics {
    let mut generics = input.generics.clone();
    if generics.params.is_empty() {
        return generics;
    }

    let where_clause = generics.make_where_clause();
    for field in input.described_fields() {
        if field.skip {
            continue;
        }
        let ty = &field.ty;
        where_clause.predicates.push(parse_quote! {
            #ty: ::lossless_json::__private::serde::Serialize
                + ::lossless_json::__private::serde::de::DeserializeOwned
        });
    }
    generics
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand_err(input: DeriveInput) -> String {
        expand(&input).unwrap_err().to_string()
    }

    #[test]
    fn test_expand_plain_struct() {
        let input: DeriveInput = parse_quote! {
            struct Person {
                name: String,
                #[lossless(state)]
                state: Lossless,
            }
        };

        let tokens = expand(&input).unwrap().to_string();
        assert!(tokens.contains("Describe for Person"));
        assert!(tokens.contains("LosslessRecord for Person"));
        assert!(!tokens.contains("Serialize for Person"));
    }

    #[test]
    fn test_rejects_two_state_fields() {
        let err = expand_err(parse_quote! {
            struct Person {
                #[lossless(state)]
                a: Lossless,
                #[lossless(state)]
                b: Lossless,
            }
        });
        assert!(err.contains("only one field"));
    }

    #[test]
    fn test_rejects_state_with_directives() {
        let err = expand_err(parse_quote! {
            struct Person {
                #[lossless(state, rename = "x")]
                state: Lossless,
            }
        });
        assert!(err.contains("cannot be combined with other field directives"));
    }

    #[test]
    fn test_rejects_skip_with_rename() {
        let err = expand_err(parse_quote! {
            struct Person {
                #[lossless(skip, rename = "x")]
                name: String,
            }
        });
        assert!(err.contains("cannot be combined with rename or omit_empty"));
    }

    #[test]
    fn test_rejects_empty_rename() {
        let err = expand_err(parse_quote! {
            struct Person {
                #[lossless(rename = "")]
                name: String,
            }
        });
        assert!(err.contains("non-empty name"));
    }

    #[test]
    fn test_rejects_duplicate_names() {
        let err = expand_err(parse_quote! {
            struct Person {
                name: String,
                #[lossless(rename = "name")]
                full_name: String,
            }
        });
        assert!(err.contains("duplicate member name `name`"));
    }

    #[test]
    fn test_expand_descriptor_directives() {
        let input: DeriveInput = parse_quote! {
            struct Person {
                #[lossless(rename = "fullName", omit_empty)]
                name: String,
                #[lossless(skip)]
                cache: String,
            }
        };

        let tokens = expand(&input).unwrap().to_string();
        assert!(tokens.contains("rename (\"fullName\")"));
        assert!(tokens.contains("omit_empty ()"));
        assert!(tokens.contains("skip ()"));
        assert!(!tokens.contains("self . cache"));
        assert!(!tokens.contains("dynamic ()"));
    }

    #[test]
    fn test_expand_marks_value_fields_dynamic() {
        let input: DeriveInput = parse_quote! {
            struct Event {
                #[lossless(omit_empty)]
                payload: serde_json::Value,
            }
        };

        let tokens = expand(&input).unwrap().to_string();
        assert!(tokens.contains("omit_empty () . dynamic ()"));
    }

    #[test]
    fn test_rejects_serde_without_state() {
        let err = expand_err(parse_quote! {
            #[lossless(serde)]
            struct Person {
                name: String,
            }
        });
        assert!(err.contains("requires a field marked #[lossless(state)]"));
    }

    #[test]
    fn test_generic_bounds_cover_projected_fields_only() {
        let input: DeriveInput = parse_quote! {
            struct Wrapper<T, C> {
                value: T,
                #[lossless(skip)]
                cache: C,
            }
        };
        let parsed = RecordInput::from_derive_input(&input).unwrap();
        let generics = bounded_generics(&parsed);
        let predicates = generics.where_clause.unwrap().predicates;
        assert_eq!(predicates.len(), 1);
        let predicate = quote!(#predicates).to_string();
        assert!(predicate.starts_with("T :"));
    }
}
