//! Derive macros for the Houseplant Haven state container
//!
//! This crate provides procedural macros to reduce boilerplate when declaring
//! action enums.
//!
//! # Available Macros
//!
//! - `#[derive(Action)]` - Implements `haven_core::Action` for an action enum
//!
//! # Example
//!
//! ```ignore
//! use haven_macros::Action;
//!
//! #[derive(Action, Clone, Debug)]
//! enum CartAction {
//!     #[init]
//!     #[action_type = "@@INIT"]
//!     Init,
//!
//!     AddToCart { plant: Product },
//!
//!     ClearCart,
//! }
//!
//! // Generated:
//! assert_eq!(CartAction::ClearCart.action_type(), "CLEAR_CART");
//! assert!(matches!(CartAction::init(), CartAction::Init));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use proc_macro::TokenStream;
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Expr, Fields, Lit, Meta, parse_macro_input};

/// Derive macro for action enums
///
/// Implements `haven_core::action::Action`:
/// - `init()` - Returns the variant marked `#[init]`
/// - `action_type()` - Returns the discriminant string of the variant
///
/// The discriminant defaults to the variant name in `SCREAMING_SNAKE_CASE`
/// (`IncrementQty` becomes `"INCREMENT_QTY"`).
///
/// # Attributes
///
/// - `#[init]` - Mark the unit variant dispatched when a store boots (exactly one)
/// - `#[action_type = "..."]` - Override the discriminant string
///
/// # Panics
///
/// This macro will produce a compile error (not a runtime panic) if:
/// - Applied to a non-enum type
/// - No variant, or more than one variant, is marked `#[init]`
/// - The `#[init]` variant has fields
/// - `#[action_type]` is not a string literal
#[proc_macro_derive(Action, attributes(init, action_type))]
pub fn derive_action(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_action(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand_action(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let Data::Enum(data_enum) = &input.data else {
        return Err(syn::Error::new_spanned(
            input,
            "#[derive(Action)] can only be used on enums",
        ));
    };

    let mut init_variant = None;
    let mut action_type_arms = Vec::with_capacity(data_enum.variants.len());

    for variant in &data_enum.variants {
        let variant_name = &variant.ident;

        if has_attribute(&variant.attrs, "init") {
            if init_variant.is_some() {
                return Err(syn::Error::new_spanned(
                    variant,
                    "Only one variant can be marked #[init]",
                ));
            }
            if !matches!(variant.fields, Fields::Unit) {
                return Err(syn::Error::new_spanned(
                    variant,
                    "The #[init] variant must not carry a payload",
                ));
            }
            init_variant = Some(variant_name);
        }

        let type_name = match action_type_override(&variant.attrs)? {
            Some(type_name) => type_name,
            None => screaming_snake_case(&variant_name.to_string()),
        };

        let pattern = match &variant.fields {
            Fields::Named(_) => quote! { Self::#variant_name { .. } },
            Fields::Unnamed(_) => quote! { Self::#variant_name(..) },
            Fields::Unit => quote! { Self::#variant_name },
        };
        action_type_arms.push(quote! { #pattern => #type_name, });
    }

    let Some(init_variant) = init_variant else {
        return Err(syn::Error::new_spanned(
            name,
            "#[derive(Action)] requires one unit variant marked #[init]",
        ));
    };

    Ok(quote! {
        impl #impl_generics ::haven_core::action::Action for #name #ty_generics #where_clause {
            fn init() -> Self {
                Self::#init_variant
            }

            fn action_type(&self) -> &'static str {
                match self {
                    #(#action_type_arms)*
                }
            }
        }
    })
}

/// Helper function to check if an attribute list contains a specific attribute
fn has_attribute(attrs: &[Attribute], name: &str) -> bool {
    attrs.iter().any(|attr| attr.path().is_ident(name))
}

/// Reads `#[action_type = "..."]` if present
fn action_type_override(attrs: &[Attribute]) -> syn::Result<Option<String>> {
    let Some(attr) = attrs.iter().find(|attr| attr.path().is_ident("action_type")) else {
        return Ok(None);
    };

    if let Meta::NameValue(meta) = &attr.meta {
        if let Expr::Lit(expr) = &meta.value {
            if let Lit::Str(value) = &expr.lit {
                return Ok(Some(value.value()));
            }
        }
    }

    Err(syn::Error::new_spanned(
        attr,
        "expected #[action_type = \"NAME\"]",
    ))
}

/// `AddToCart` -> `ADD_TO_CART`
fn screaming_snake_case(ident: &str) -> String {
    let mut out = String::with_capacity(ident.len() + 4);
    let mut prev_lower = false;

    for ch in ident.chars() {
        if ch == '_' {
            out.push('_');
            prev_lower = false;
            continue;
        }
        if ch.is_uppercase() && prev_lower {
            out.push('_');
        }
        prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
        out.extend(ch.to_uppercase());
    }

    out
}
