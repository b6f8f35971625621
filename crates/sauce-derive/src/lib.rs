//! Proc-macro helpers for `sauce-core`.
//!
//! The teacher codebase (`modular_derive`) generates message-dispatch
//! boilerplate for an open-ended, user-patchable module graph. This engine's
//! topology is fixed, so we only need the same tag-based dispatch idea
//! applied to a closed catalog of `dsp_kind` variants: `dsp_kind_table!`
//! expands an enum-of-structs into a dispatcher that forwards the shared
//! `DspKind` method calls to whichever variant is active.

use convert_case::{Case, Casing};
use proc_macro::TokenStream;
use quote::quote;
use syn::{
    Ident, Token, braced, parenthesized,
    parse::{Parse, ParseStream},
    parse_macro_input,
    punctuated::Punctuated,
};

struct Variant {
    name: Ident,
    inner: Ident,
}

struct DspKindTable {
    enum_name: Ident,
    variants: Vec<Variant>,
}

impl Parse for Variant {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let name: Ident = input.parse()?;
        let content;
        parenthesized!(content in input);
        let inner: Ident = content.parse()?;
        Ok(Variant { name, inner })
    }
}

impl Parse for DspKindTable {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        input.parse::<Token![enum]>()?;
        let enum_name: Ident = input.parse()?;
        let content;
        braced!(content in input);
        let variants = Punctuated::<Variant, Token![,]>::parse_terminated(&content)?;
        Ok(DspKindTable {
            enum_name,
            variants: variants.into_iter().collect(),
        })
    }
}

/// Expands a closed enum of `dsp_kind` implementations into a dispatcher
/// implementing [`DspKind`] by forwarding to the active variant, plus a
/// `kind_name()` accessor using the variant's `snake_case` identifier as the
/// descriptor-facing string (matching the `dsp_kind` strings in §3.6).
#[proc_macro]
pub fn dsp_kind_table(input: TokenStream) -> TokenStream {
    let table = parse_macro_input!(input as DspKindTable);
    let enum_name = &table.enum_name;

    let variant_defs = table.variants.iter().map(|v| {
        let name = &v.name;
        let inner = &v.inner;
        quote! { #name(#inner) }
    });

    let render_arms = table.variants.iter().map(|v| {
        let name = &v.name;
        quote! { #enum_name::#name(inner) => inner.render(sample_rate) }
    });

    let set_pitch_arms = table.variants.iter().map(|v| {
        let name = &v.name;
        quote! { #enum_name::#name(inner) => inner.set_pitch(hz) }
    });

    let trigger_arms = table.variants.iter().map(|v| {
        let name = &v.name;
        quote! { #enum_name::#name(inner) => inner.trigger() }
    });

    let reset_arms = table.variants.iter().map(|v| {
        let name = &v.name;
        quote! { #enum_name::#name(inner) => inner.reset() }
    });

    let name_arms = table.variants.iter().map(|v| {
        let name = &v.name;
        let snake = name.to_string().to_case(Case::Snake);
        quote! { #enum_name::#name(_) => #snake }
    });

    let expanded = quote! {
        pub enum #enum_name {
            #(#variant_defs),*
        }

        impl crate::dsp::DspKind for #enum_name {
            fn render(&mut self, sample_rate: f32) -> f32 {
                match self {
                    #(#render_arms),*
                }
            }

            fn set_pitch(&mut self, hz: f32) {
                match self {
                    #(#set_pitch_arms),*
                }
            }

            fn trigger(&mut self) {
                match self {
                    #(#trigger_arms),*
                }
            }

            fn reset(&mut self) {
                match self {
                    #(#reset_arms),*
                }
            }
        }

        impl #enum_name {
            pub fn kind_name(&self) -> &'static str {
                match self {
                    #(#name_arms),*
                }
            }
        }
    };

    expanded.into()
}
