//! Derive macros used throughout [fuelnet](../fuelnet), mostly to keep the error enums free
//! of `From` boilerplate so that `?` can lift lower level errors into them.

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields};

#[proc_macro_derive(FromForAllUnnamedVariants)]
/// Derives `From<T>` for every variant of the enum that wraps exactly one unnamed field `T`.
///
/// Variants with named fields, unit variants and tuple variants with more than one field are
/// left alone, so they still have to be constructed explicitly.
pub fn from_for_all_unnamed_variants(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let enum_name = &input.ident;
    let (impl_generics, type_generics, where_clause) = input.generics.split_for_impl();

    let variants = match &input.data {
        Data::Enum(enm) => &enm.variants,
        _ => {
            return syn::Error::new_spanned(
                &input.ident,
                "'FromForAllUnnamedVariants' can only be derived for enums",
            )
            .to_compile_error()
            .into()
        }
    };

    let wrapping_variants = variants.iter().filter_map(|variant| match &variant.fields {
        Fields::Unnamed(fields) if fields.unnamed.len() == 1 => {
            fields.unnamed.first().map(|field| (&variant.ident, &field.ty))
        }
        _ => None,
    });

    let (names, types): (Vec<_>, Vec<_>) = wrapping_variants.unzip();

    quote! {
        #(
            impl #impl_generics From<#types> for #enum_name #type_generics #where_clause {
                fn from(value: #types) -> Self {
                    #enum_name::#names(value)
                }
            }
        )*
    }
    .into()
}
