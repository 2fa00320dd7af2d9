//! `LosslessRecord` and serde impl generation for structs with a state field.

use crate::parse::RecordInput;
use proc_macro2::TokenStream;
use quote::quote;
use syn::{parse_quote, GenericParam, Generics};

pub fn generate(input: &RecordInput, generics: &Generics) -> syn::Result<TokenStream> {
    let Some(state) = input.state_field() else {
        return Ok(TokenStream::new());
    };
    let state = state.ident()?;
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let record = quote! {
        impl #impl_generics ::lossless_json::LosslessRecord for #struct_name #ty_generics #where_clause {
            fn state(&self) -> &::lossless_json::Lossless {
                &self.#state
            }

            fn state_mut(&mut self) -> &mut ::lossless_json::Lossless {
                &mut self.#state
            }
        }
    };

    if !input.serde {
        return Ok(record);
    }

    let mut de_generics = generics.clone();
    de_generics
        .params
        .insert(0, GenericParam::Lifetime(parse_quote!('de)));
    de_generics
        .make_where_clause()
        .predicates
        .push(parse_quote!(#struct_name #ty_generics: ::core::default::Default));
    let (de_impl_generics, _, de_where_clause) = de_generics.split_for_impl();

    Ok(quote! {
        #record

        impl #impl_generics ::lossless_json::__private::serde::Serialize
            for #struct_name #ty_generics #where_clause
        {
            fn serialize<__S>(
                &self,
                serializer: __S,
            ) -> ::core::result::Result<__S::Ok, __S::Error>
            where
                __S: ::lossless_json::__private::serde::Serializer,
            {
                ::lossless_json::lossless::serialize(self, serializer)
            }
        }

        impl #de_impl_generics ::lossless_json::__private::serde::Deserialize<'de>
            for #struct_name #ty_generics #de_where_clause
        {
            fn deserialize<__D>(deserializer: __D) -> ::core::result::Result<Self, __D::Error>
            where
                __D: ::lossless_json::__private::serde::Deserializer<'de>,
            {
                ::lossless_json::lossless::deserialize(deserializer)
            }
        }
    })
}
