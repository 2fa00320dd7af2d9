//! `Describe` impl generation.

use crate::parse::{FieldInput, RecordInput};
use proc_macro2::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::Generics;

pub fn generate(input: &RecordInput, generics: &Generics) -> syn::Result<TokenStream> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let fields = input.described_fields();
    let descriptors = fields
        .iter()
        .map(|field| descriptor(field))
        .collect::<syn::Result<Vec<_>>>()?;

    let mut capture_arms = Vec::new();
    let mut assign_arms = Vec::new();
    for (index, field) in fields.iter().enumerate() {
        if field.skip {
            continue;
        }
        let ident = field.ident()?;
        capture_arms.push(quote! {
            #index => ::lossless_json::FieldValue::capture(&fields[#index], &self.#ident)
                .map(::core::option::Option::Some),
        });
        assign_arms.push(quote! {
            #index => self.#ident = ::lossless_json::coerce_field(&fields[#index], value, options)?,
        });
    }

    Ok(quote! {
        impl #impl_generics ::lossless_json::Describe for #struct_name #ty_generics #where_clause {
            fn fields() -> &'static [::lossless_json::FieldDescriptor] {
                const FIELDS: &[::lossless_json::FieldDescriptor] = &[#(#descriptors),*];
                FIELDS
            }

            #[allow(unused_variables)]
            fn capture(
                &self,
                index: usize,
            ) -> ::lossless_json::Result<::core::option::Option<::lossless_json::FieldValue>> {
                let fields = <Self as ::lossless_json::Describe>::fields();
                match index {
                    #(#capture_arms)*
                    _ => ::core::result::Result::Ok(::core::option::Option::None),
                }
            }

            #[allow(unused_variables)]
            fn assign(
                &mut self,
                index: usize,
                value: &::lossless_json::Value,
                options: &::lossless_json::Options,
            ) -> ::lossless_json::Result<()> {
                let fields = <Self as ::lossless_json::Describe>::fields();
                match index {
                    #(#assign_arms)*
                    _ => {}
                }
                ::core::result::Result::Ok(())
            }
        }
    })
}

fn descriptor(field: &FieldInput) -> syn::Result<TokenStream> {
    let ident = field.ident()?.unraw().to_string();
    let mut tokens = quote! { ::lossless_json::FieldDescriptor::new(#ident) };
    if let Some(name) = &field.rename {
        tokens = quote! { #tokens.rename(#name) };
    }
    if field.skip {
        tokens = quote! { #tokens.skip() };
    }
    if field.omit_empty {
        tokens = quote! { #tokens.omit_empty() };
    }
    if field.is_dynamic() {
        tokens = quote! { #tokens.dynamic() };
    }
    Ok(tokens)
}
