use std::collections::HashSet;

use proc_macro2::TokenStream;
use quote::quote;
use syn::{
    ext::IdentExt, parse_quote, Data, DeriveInput, Fields, GenericParam, Ident, LitStr, Type,
    Visibility,
};

struct RecordField<'a> {
    ident: &'a Ident,
    ty: &'a Type,
    /// JSON key the field is read from.
    key: String,
}

/// Generate `Record` and `Field` implementations for `input`.
///
/// `krate` is the path to the `recordmap` crate.
pub(crate) fn record(input: &DeriveInput, krate: &TokenStream) -> syn::Result<TokenStream> {
    if let Some(attr) = input.attrs.iter().find(|attr| attr.path().is_ident("record")) {
        return Err(syn::Error::new_spanned(
            attr,
            "`record` attributes are only supported on fields",
        ));
    }
    if let Some(lifetime) = input.generics.lifetimes().next() {
        return Err(syn::Error::new_spanned(
            lifetime,
            "Records own their data, lifetime parameters are not supported",
        ));
    }
    let fields = record_fields(input)?;

    let mut generics = input.generics.clone();
    for param in &mut generics.params {
        if let GenericParam::Type(param) = param {
            param.bounds.push(parse_quote!(#krate::Field));
        }
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let name = &input.ident;
    let visibility = visibility(&input.vis);
    let descriptors = fields.iter().map(|field| {
        let key = &field.key;
        let ty = field.ty;
        quote! {
            #krate::FieldDescriptor {
                name: #key,
                field_type: <#ty as #krate::Field>::field_type,
            }
        }
    });
    let construct = construct(input, &fields, krate);

    Ok(quote! {
        impl #impl_generics #krate::Record for #name #ty_generics #where_clause {
            const SHAPE: #krate::Shape = #krate::Shape {
                module_path: ::core::module_path!(),
                visibility: #krate::Visibility::#visibility,
                fields: &[#(#descriptors),*],
            };

            #construct
        }

        impl #impl_generics #krate::Field for #name #ty_generics #where_clause {
            fn field_type() -> #krate::FieldType {
                #krate::FieldType::Nested(#krate::Target::of::<Self>())
            }

            fn from_native(value: #krate::NativeValue) -> ::core::option::Option<Self> {
                value.into_record::<Self>().map(|record| *record)
            }
        }
    })
}

fn record_fields(input: &DeriveInput) -> syn::Result<Vec<RecordField<'_>>> {
    let named = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            Fields::Unit => return Ok(Vec::new()),
            Fields::Unnamed(unnamed) => {
                return Err(syn::Error::new_spanned(
                    unnamed,
                    "Tuple structs are not supported, declare named fields",
                ))
            }
        },
        Data::Enum(data) => {
            return Err(syn::Error::new_spanned(
                data.enum_token,
                "Enums are not supported, only structs can be records",
            ))
        }
        Data::Union(data) => {
            return Err(syn::Error::new_spanned(
                data.union_token,
                "Unions are not supported, only structs can be records",
            ))
        }
    };

    let mut seen = HashSet::with_capacity(named.len());
    let mut fields = Vec::with_capacity(named.len());
    for field in named {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let key = field_key(field, ident)?;
        if !seen.insert(key.clone()) {
            return Err(syn::Error::new_spanned(
                field,
                format!("Duplicate JSON key `{key}`"),
            ));
        }
        fields.push(RecordField {
            ident,
            ty: &field.ty,
            key,
        });
    }
    Ok(fields)
}

fn field_key(field: &syn::Field, ident: &Ident) -> syn::Result<String> {
    let mut key = None;
    for attr in &field.attrs {
        if !attr.path().is_ident("record") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                let value: LitStr = meta.value()?.parse()?;
                key = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("Expected `rename` attribute"))
            }
        })?;
    }
    Ok(key.unwrap_or_else(|| ident.unraw().to_string()))
}

fn construct(input: &DeriveInput, fields: &[RecordField<'_>], krate: &TokenStream) -> TokenStream {
    let signature = |arg: TokenStream| {
        quote! {
            fn construct(#arg: &mut #krate::Fields) -> ::core::result::Result<Self, #krate::Error>
        }
    };
    if fields.is_empty() {
        let signature = signature(quote!(_fields));
        let instance = match &input.data {
            Data::Struct(data) if matches!(data.fields, Fields::Unit) => quote!(Self),
            _ => quote!(Self {}),
        };
        return quote! {
            #signature {
                ::core::result::Result::Ok(#instance)
            }
        };
    }
    let signature = signature(quote!(fields));
    let values = fields.iter().map(|field| {
        let ident = field.ident;
        let ty = field.ty;
        let key = &field.key;
        quote! { #ident: fields.take::<#ty>(#key)? }
    });
    quote! {
        #signature {
            ::core::result::Result::Ok(Self { #(#values),* })
        }
    }
}

/// Name of the `recordmap::Visibility` variant matching `vis`.
fn visibility(vis: &Visibility) -> Ident {
    let variant = match vis {
        Visibility::Public(_) => "Public",
        Visibility::Restricted(restricted) => {
            if restricted.path.is_ident("self") {
                "Private"
            } else if restricted.path.is_ident("super") {
                "Super"
            } else {
                // `pub(crate)` and `pub(in path)`
                "Crate"
            }
        }
        Visibility::Inherited => "Private",
    };
    Ident::new(variant, proc_macro2::Span::call_site())
}
