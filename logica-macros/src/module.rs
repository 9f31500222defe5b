//! Module-related macros.
//!
//! This module contains:
//! - `#[derive(LogicModule)]` - Derive macro for implementing the `LogicModule` trait

use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Field, Fields, Type, parse_macro_input};

fn is_base_type(ty: &Type) -> bool {
    match ty {
        Type::Path(type_path) => type_path
            .path
            .segments
            .last()
            .is_some_and(|seg| seg.ident == "ModuleBase"),
        _ => false,
    }
}

fn find_base_field<'a>(fields: impl Iterator<Item = &'a Field> + Clone) -> Option<&'a Field> {
    fields
        .clone()
        .find(|f| f.attrs.iter().any(|a| a.path().is_ident("base")))
        .or_else(|| fields.into_iter().find(|f| is_base_type(&f.ty)))
}

/// Implementation of `#[derive(LogicModule)]`.
pub fn derive_logic_module_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return syn::Error::new_spanned(
                    &input,
                    "#[derive(LogicModule)] requires a struct with named fields",
                )
                .to_compile_error()
                .into();
            }
        },
        _ => {
            return syn::Error::new_spanned(&input, "#[derive(LogicModule)] can only be used on structs")
                .to_compile_error()
                .into();
        }
    };

    let Some(base_field) = find_base_field(fields.iter()) else {
        return syn::Error::new_spanned(
            &input,
            "#[derive(LogicModule)] needs a `ModuleBase` field (or a field marked #[base])",
        )
        .to_compile_error()
        .into();
    };
    let base_ident = &base_field.ident;

    let initializers = fields.iter().map(|f| {
        let ident = &f.ident;
        if f.ident == base_field.ident {
            quote! { #ident: base }
        } else {
            quote! { #ident: ::core::default::Default::default() }
        }
    });

    let expanded = quote! {
        impl #impl_generics ::logica::LogicModule for #name #ty_generics #where_clause {
            fn from_base(base: ::logica::ModuleBase) -> Self {
                Self {
                    #(#initializers),*
                }
            }

            fn base(&self) -> &::logica::ModuleBase {
                &self.#base_ident
            }
        }
    };

    TokenStream::from(expanded)
}
