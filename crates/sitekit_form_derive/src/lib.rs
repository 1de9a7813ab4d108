use proc_macro::TokenStream;
use proc_macro2::{Ident, Span, TokenStream as TokenStream2};
use proc_macro_crate::{FoundCrate, crate_name};
use quote::{format_ident, quote};
use syn::{Attribute, Data, DeriveInput, Fields, LitStr, parse_macro_input};

/// Generates one zero-sized lens per named field plus a `<Model>Fields`
/// accessor struct. A field's key defaults to its name and can be
/// overridden with `#[form(rename = "...")]`.
#[proc_macro_derive(FormModel, attributes(form))]
pub fn derive_form_model(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(input) {
        Ok(tokens) => tokens.into(),
        Err(error) => error.to_compile_error().into(),
    }
}

fn expand(input: DeriveInput) -> syn::Result<TokenStream2> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            input.ident,
            "FormModel derive supports only non-generic structs",
        ));
    }

    let model_ident = input.ident;
    let fields_struct_ident = format_ident!("{model_ident}Fields");

    let named_fields = match input.data {
        Data::Struct(data) => match data.fields {
            Fields::Named(fields) => fields.named,
            _ => {
                return Err(syn::Error::new(
                    Span::call_site(),
                    "FormModel derive requires a struct with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new(
                Span::call_site(),
                "FormModel derive is only supported on structs",
            ));
        }
    };

    let sitekit = sitekit_path();
    let mut lens_defs = Vec::new();
    let mut fields_methods = Vec::new();
    let mut keys = Vec::new();

    for field in named_fields {
        let Some(field_ident) = field.ident else {
            continue;
        };
        let key = match field_key_override(&field.attrs)? {
            Some(key) => key,
            None => field_ident.to_string(),
        };
        let field_ty = field.ty;
        let lens_ident = format_ident!(
            "{model_ident}{}Lens",
            to_pascal_case(&field_ident.to_string())
        );

        lens_defs.push(quote! {
            #[derive(Clone, Copy, Debug, Default)]
            pub struct #lens_ident;

            impl #sitekit::form::FieldLens<#model_ident> for #lens_ident {
                type Value = #field_ty;

                fn key(self) -> #sitekit::form::FieldKey {
                    #sitekit::form::FieldKey::new(#key)
                }

                fn get<'a>(self, model: &'a #model_ident) -> &'a Self::Value {
                    &model.#field_ident
                }

                fn set(self, model: &mut #model_ident, value: Self::Value) {
                    model.#field_ident = value;
                }
            }
        });

        fields_methods.push(quote! {
            pub const fn #field_ident(&self) -> #lens_ident {
                #lens_ident
            }
        });

        keys.push(quote!(#sitekit::form::FieldKey::new(#key)));
    }

    Ok(quote! {
        #[derive(Clone, Copy, Debug, Default)]
        pub struct #fields_struct_ident;

        impl #fields_struct_ident {
            #(#fields_methods)*
        }

        impl #sitekit::form::FormModel for #model_ident {
            type Fields = #fields_struct_ident;

            const FIELD_KEYS: &'static [#sitekit::form::FieldKey] = &[#(#keys),*];

            fn fields() -> Self::Fields {
                #fields_struct_ident
            }
        }

        #(#lens_defs)*
    })
}

fn field_key_override(attrs: &[Attribute]) -> syn::Result<Option<String>> {
    let mut key = None;
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("form")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                let value: LitStr = meta.value()?.parse()?;
                if value.value().is_empty() {
                    return Err(meta.error("form key must not be empty"));
                }
                key = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("unsupported form attribute, expected `rename`"))
            }
        })?;
    }
    Ok(key)
}

fn sitekit_path() -> TokenStream2 {
    match crate_name("sitekit") {
        Ok(FoundCrate::Name(name)) => {
            let ident = Ident::new(&name, Span::call_site());
            quote!(::#ident)
        }
        Ok(FoundCrate::Itself) => quote!(crate),
        Err(_) => quote!(::sitekit),
    }
}

fn to_pascal_case(input: &str) -> String {
    input
        .split('_')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}
