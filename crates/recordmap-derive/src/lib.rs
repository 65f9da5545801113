use proc_macro::TokenStream;
use proc_macro2::Span;
use proc_macro_crate::{crate_name, FoundCrate};
use quote::{format_ident, quote};
use syn::{parse_macro_input, DeriveInput};

mod expand;

/// Derives `recordmap::Record` (and `recordmap::Field`, so the record can be nested in others).
///
/// # Usage
///
/// ```ignore
/// #[derive(recordmap::Record)]
/// struct Product {
///     #[record(rename = "productId")]
///     product_id: String,
///     #[record(rename = "stockQuantity")]
///     stock_quantity: i32,
/// }
/// ```
///
/// Supported on structs with named fields and on unit structs. Field order defines the
/// constructor order; the JSON key is the field name unless renamed.
#[proc_macro_derive(Record, attributes(record))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match crate_path().and_then(|krate| expand::record(&input, &krate)) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Path to the `recordmap` crate as seen by the crate invoking the derive.
fn crate_path() -> syn::Result<proc_macro2::TokenStream> {
    match crate_name("recordmap") {
        // `recordmap` declares `extern crate self as recordmap`
        Ok(FoundCrate::Itself) => Ok(quote!(::recordmap)),
        Ok(FoundCrate::Name(name)) => {
            let name = format_ident!("{}", name);
            Ok(quote!(::#name))
        }
        Err(err) => Err(syn::Error::new(
            Span::call_site(),
            format!("`recordmap` must be a dependency to derive `Record`: {err}"),
        )),
    }
}
