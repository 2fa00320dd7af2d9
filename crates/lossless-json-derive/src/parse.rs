//! Parsing logic for the Describe derive macro.

use darling::{ast, FromDeriveInput, FromField};
use syn::ext::IdentExt;
use syn::{Generics, Ident, Type};

/// Parsed struct-level options.
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(lossless), supports(struct_named))]
pub struct RecordInput {
    pub ident: Ident,

    pub generics: Generics,

    pub data: ast::Data<(), FieldInput>,

    /// Emit serde impls delegating to the lossless adapters.
    #[darling(default)]
    pub serde: bool,
}

impl RecordInput {
    /// Get the fields as a vector.
    pub fn fields(&self) -> Vec<&FieldInput> {
        self.data
            .as_ref()
            .take_struct()
            .map(|s| s.fields.to_vec())
            .unwrap_or_default()
    }

    /// Fields that get a descriptor: everything except the state field.
    pub fn described_fields(&self) -> Vec<&FieldInput> {
        self.fields().into_iter().filter(|f| !f.state).collect()
    }

    pub fn state_field(&self) -> Option<&FieldInput> {
        self.fields().into_iter().find(|f| f.state)
    }
}

/// Parsed field-level options.
#[derive(Debug, FromField)]
#[darling(attributes(lossless))]
pub struct FieldInput {
    pub ident: Option<Ident>,

    pub ty: Type,

    /// Member name override.
    #[darling(default)]
    pub rename: Option<String>,

    #[darling(default)]
    pub skip: bool,

    #[darling(default)]
    pub omit_empty: bool,

    /// Marks the `Lossless` wrapper field.
    #[darling(default)]
    pub state: bool,
}

impl FieldInput {
    pub fn ident(&self) -> syn::Result<&Ident> {
        self.ident
            .as_ref()
            .ok_or_else(|| syn::Error::new_spanned(&self.ty, "named field required"))
    }

    /// Whether the field holds a dynamic JSON value, spelled `Value` with
    /// any path prefix.
    pub fn is_dynamic(&self) -> bool {
        match &self.ty {
            Type::Path(ty) => ty.qself.is_none()
                && ty
                    .path
                    .segments
                    .last()
                    .is_some_and(|segment| segment.ident == "Value" && segment.arguments.is_none()),
            _ => false,
        }
    }

    /// Get the JSON member name for this field.
    pub fn json_key(&self) -> syn::Result<String> {
        match &self.rename {
            Some(name) => Ok(name.clone()),
            None => Ok(self.ident()?.unraw().to_string()),
        }
    }
}
