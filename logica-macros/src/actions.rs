//! Action-related macros.
//!
//! This module contains:
//! - `#[actions]` - Attribute macro turning `#[action(...)]` methods into registered actions

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{
    Attribute, Expr, FnArg, Ident, ImplItem, ImplItemFn, ItemImpl, LitStr, Meta, Token,
    ext::IdentExt,
    parenthesized,
    parse::{Parse, ParseStream},
    parse_macro_input,
    punctuated::Punctuated,
};

/// A field name: either an identifier (`foo`, `type`) or a string literal.
struct FieldName(String);

impl Parse for FieldName {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        if input.peek(LitStr) {
            let lit: LitStr = input.parse()?;
            Ok(FieldName(lit.value()))
        } else {
            let ident = input.call(Ident::parse_any)?;
            Ok(FieldName(ident.unraw().to_string()))
        }
    }
}

/// `field = expr` inside `verify(...)`.
struct VerifyPair {
    field: String,
    verifier: Expr,
}

impl Parse for VerifyPair {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let FieldName(field) = input.parse()?;
        input.parse::<Token![=]>()?;
        let verifier: Expr = input.parse()?;
        Ok(VerifyPair { field, verifier })
    }
}

/// Arguments for the `#[action]` marker.
#[derive(Default)]
pub(crate) struct ActionArgs {
    pub name: Option<String>,
    pub needs: Vec<String>,
    pub verify: Vec<(String, Expr)>,
}

impl Parse for ActionArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut args = ActionArgs::default();

        while !input.is_empty() {
            let ident: Ident = input.parse()?;

            match ident.to_string().as_str() {
                "name" => {
                    input.parse::<Token![=]>()?;
                    let lit: LitStr = input.parse()?;
                    args.name = Some(lit.value());
                }
                "needs" => {
                    let content;
                    parenthesized!(content in input);
                    let fields = Punctuated::<FieldName, Token![,]>::parse_terminated(&content)?;
                    args.needs.extend(fields.into_iter().map(|FieldName(f)| f));
                }
                "verify" => {
                    let content;
                    parenthesized!(content in input);
                    let pairs = Punctuated::<VerifyPair, Token![,]>::parse_terminated(&content)?;
                    args.verify
                        .extend(pairs.into_iter().map(|p| (p.field, p.verifier)));
                }
                other => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unknown action attribute: {}", other),
                    ));
                }
            }

            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(args)
    }
}

fn take_action_attr(method: &mut ImplItemFn) -> syn::Result<Option<ActionArgs>> {
    let Some(pos) = method
        .attrs
        .iter()
        .position(|a| a.path().is_ident("action"))
    else {
        return Ok(None);
    };

    let attr = method.attrs.remove(pos);
    let args = match &attr.meta {
        Meta::Path(_) => ActionArgs::default(),
        Meta::List(_) => attr.parse_args::<ActionArgs>()?,
        Meta::NameValue(nv) => {
            return Err(syn::Error::new_spanned(
                nv,
                "expected #[action] or #[action(...)]",
            ));
        }
    };
    Ok(Some(args))
}

fn check_signature(method: &ImplItemFn) -> syn::Result<()> {
    let inputs = &method.sig.inputs;
    let has_receiver = matches!(inputs.first(), Some(FnArg::Receiver(r)) if r.reference.is_some() && r.mutability.is_none());
    if !has_receiver || inputs.len() != 2 {
        return Err(syn::Error::new_spanned(
            &method.sig,
            "action methods must have the signature `fn(&self, cx: &Context<'_, Self>) -> Result<T, Fault>`",
        ));
    }
    if method.sig.asyncness.is_some() {
        return Err(syn::Error::new_spanned(
            &method.sig.asyncness,
            "action methods must be synchronous",
        ));
    }
    Ok(())
}

fn is_doc(attr: &Attribute) -> bool {
    attr.path().is_ident("doc")
}

/// Generated pieces for one action method.
struct Generated {
    items: Vec<TokenStream2>,
    ctor: Ident,
}

fn generate_action(mut method: ImplItemFn, args: ActionArgs) -> Generated {
    let ident = method.sig.ident.clone();
    let vis = method.vis.clone();
    let action_name = args.name.unwrap_or_else(|| ident.unraw().to_string());

    let body_ident = format_ident!("__logica_body_{}", ident.unraw());
    let ctor = format_ident!("__logica_action_{}", ident.unraw());

    let docs: Vec<Attribute> = method.attrs.iter().filter(|a| is_doc(a)).cloned().collect();
    method.attrs.retain(|a| !is_doc(a));
    method.attrs.push(syn::parse_quote!(#[doc(hidden)]));
    method.vis = syn::Visibility::Inherited;
    method.sig.ident = body_ident.clone();

    let needs = args.needs.iter();
    let verify_fields = args.verify.iter().map(|(f, _)| f);
    let verify_exprs = args.verify.iter().map(|(_, e)| e);

    let ctor_fn = quote! {
        #[doc(hidden)]
        fn #ctor() -> ::logica::Action<Self> {
            ::logica::Action::new(#action_name, |cx: &::logica::Context<'_, Self>| {
                cx.module().#body_ident(cx)
            })
            #(.need(#needs))*
            #(.verify(#verify_fields, #verify_exprs))*
        }
    };

    let call_fn = quote! {
        #(#docs)*
        #[allow(dead_code)]
        #vis fn #ident(
            &self,
            args: ::logica::Args,
        ) -> ::core::result::Result<::logica::Outcome, ::logica::LogicError> {
            <Self as ::logica::LogicModule>::call(self, #action_name, &args)
        }
    };

    Generated {
        items: vec![quote! { #method }, ctor_fn, call_fn],
        ctor,
    }
}

/// Implementation of the `#[actions]` macro.
pub fn actions_impl(attr: TokenStream, item: TokenStream) -> TokenStream {
    if !attr.is_empty() {
        return syn::Error::new(
            proc_macro2::Span::call_site(),
            "#[actions] takes no arguments",
        )
        .to_compile_error()
        .into();
    }

    let input = parse_macro_input!(item as ItemImpl);

    if let Some((_, path, _)) = &input.trait_ {
        return syn::Error::new_spanned(path, "#[actions] must be placed on an inherent impl block")
            .to_compile_error()
            .into();
    }

    let mut kept = Vec::new();
    let mut generated = Vec::new();
    let mut ctors = Vec::new();

    for item in input.items.iter().cloned() {
        match item {
            ImplItem::Fn(mut method) => match take_action_attr(&mut method) {
                Ok(Some(args)) => {
                    if let Err(err) = check_signature(&method) {
                        return err.to_compile_error().into();
                    }
                    let out = generate_action(method, args);
                    generated.extend(out.items);
                    ctors.push(out.ctor);
                }
                Ok(None) => kept.push(quote! { #method }),
                Err(err) => return err.to_compile_error().into(),
            },
            other => kept.push(quote! { #other }),
        }
    }

    let attrs = &input.attrs;
    let self_ty = &input.self_ty;
    let (impl_generics, _, where_clause) = input.generics.split_for_impl();

    let expanded = quote! {
        #(#attrs)*
        impl #impl_generics #self_ty #where_clause {
            #(#kept)*
            #(#generated)*
        }

        impl #impl_generics ::logica::ActionProvider for #self_ty #where_clause {
            fn register_actions(actions: &mut ::logica::ActionSet<Self>) {
                #(actions.add(Self::#ctors());)*
            }
        }
    };

    TokenStream::from(expanded)
}
