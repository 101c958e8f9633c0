use proc_macro::TokenStream;
use quote::quote;
use syn::{
    parse_macro_input, parse_quote, Attribute, Data, DeriveInput, Expr, ExprLit, Fields,
    GenericParam, Lit, LitStr, Meta, Visibility,
};

/// Derive `config_bindr::Bind` for a struct with named fields.
///
/// Only fields that are visible outside the struct (`pub`, `pub(crate)`, ...)
/// take part in binding. Field annotations:
///
/// - `#[env("VAR")]` binds the field to `VAR`
/// - `#[env(var = "VAR", doc = "...")]` same, with an explicit description
/// - `#[env(skip)]` or `#[env("-")]` never binds the field and does not
///   recurse into it, so its type does not need to implement `Bind`
///
/// Without `doc = ...`, the field's `///` comment is used as its description.
/// The struct must implement `Default`.
#[proc_macro_derive(Bind, attributes(env))]
pub fn derive_bind(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match generate_bind(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn generate_bind(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let struct_name = &input.ident;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "#[derive(Bind)] only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "#[derive(Bind)] only supports structs",
            ));
        }
    };

    let mut descriptors = Vec::new();
    let mut visits = Vec::new();

    for field in fields {
        let config = parse_field_config(&field.attrs)?;

        // Private fields are never bound
        if matches!(field.vis, Visibility::Inherited) {
            continue;
        }

        let Some(field_name) = field.ident.as_ref() else {
            return Err(syn::Error::new_spanned(field, "expected a named field"));
        };
        let name = field_name.to_string();

        let cfg_attrs: Vec<&Attribute> = field
            .attrs
            .iter()
            .filter(|attr| attr.path().is_ident("cfg"))
            .collect();

        let tag = match &config.mode {
            TagMode::Untagged => quote! { ::config_bindr::Tag::None },
            TagMode::Skip => quote! { ::config_bindr::Tag::Skip },
            TagMode::Var(var) => quote! { ::config_bindr::Tag::from_attr(#var) },
        };
        let doc = config.doc.unwrap_or_default();

        let descriptor = quote! {
            ::config_bindr::FieldDescriptor::new(#name, #tag, #doc)
        };
        // Skipped fields are listed but never visited, so their type needs no Bind impl
        if !matches!(config.mode, TagMode::Skip) {
            visits.push(quote! {
                #(#cfg_attrs)*
                binder.field(&#descriptor, &mut self.#field_name)?;
            });
        }
        descriptors.push(quote! {
            #(#cfg_attrs)*
            #descriptor
        });
    }

    let mut generics = input.generics.clone();
    for param in generics.params.iter_mut() {
        if let GenericParam::Type(ty) = param {
            ty.bounds.push(parse_quote!(::config_bindr::Bind));
        }
    }
    generics
        .make_where_clause()
        .predicates
        .push(parse_quote!(Self: ::core::default::Default));
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::config_bindr::Bind for #struct_name #ty_generics #where_clause {
            const SHAPE: ::config_bindr::Shape = ::config_bindr::Shape::Record;

            #[allow(unused_variables)]
            fn bind_value(
                &mut self,
                field: &::config_bindr::FieldDescriptor,
                binder: &mut ::config_bindr::Binder<'_>,
            ) -> ::core::result::Result<(), ::config_bindr::ConfigError> {
                #(#visits)*
                ::core::result::Result::Ok(())
            }

            fn zero() -> ::core::option::Option<Self> {
                ::core::option::Option::Some(<Self as ::core::default::Default>::default())
            }

            fn fields() -> &'static [::config_bindr::FieldDescriptor] {
                const FIELDS: &[::config_bindr::FieldDescriptor] = &[
                    #(#descriptors),*
                ];
                FIELDS
            }
        }
    })
}

#[derive(Debug)]
enum TagMode {
    Untagged,
    Skip,
    Var(String),
}

#[derive(Debug)]
struct FieldConfig {
    mode: TagMode,
    doc: Option<String>,
}

/// Parse `#[env(...)]` plus `///` comments on one field
fn parse_field_config(attrs: &[Attribute]) -> syn::Result<FieldConfig> {
    let mut mode = TagMode::Untagged;
    let mut explicit_doc = None;
    let mut seen_env = false;

    for attr in attrs.iter().filter(|attr| attr.path().is_ident("env")) {
        if seen_env {
            return Err(syn::Error::new_spanned(
                attr,
                "duplicate #[env] attribute on field",
            ));
        }
        seen_env = true;

        if !matches!(attr.meta, Meta::List(_)) {
            return Err(syn::Error::new_spanned(
                attr,
                "env attribute must be a list: #[env(\"VAR_NAME\")]",
            ));
        }

        // Shorthand: #[env("VAR_NAME")]
        if let Ok(var) = attr.parse_args::<LitStr>() {
            mode = var_mode(var.value());
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                mode = TagMode::Skip;
            } else if meta.path.is_ident("var") {
                let value: LitStr = meta.value()?.parse()?;
                mode = var_mode(value.value());
            } else if meta.path.is_ident("doc") {
                let value: LitStr = meta.value()?.parse()?;
                explicit_doc = Some(value.value().trim().to_string());
            } else {
                return Err(meta.error("expected one of: \"VAR_NAME\", var = \"...\", doc = \"...\", skip"));
            }
            Ok(())
        })?;
    }

    let doc = explicit_doc.or_else(|| doc_comment(attrs));

    Ok(FieldConfig { mode, doc })
}

fn var_mode(var: String) -> TagMode {
    match var.as_str() {
        "" => TagMode::Untagged,
        "-" => TagMode::Skip,
        _ => TagMode::Var(var),
    }
}

/// Join the lines of a `///` comment into one description
fn doc_comment(attrs: &[Attribute]) -> Option<String> {
    let lines: Vec<String> = attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            Meta::NameValue(nv) => match &nv.value {
                Expr::Lit(ExprLit {
                    lit: Lit::Str(s), ..
                }) => Some(s.value().trim().to_string()),
                _ => None,
            },
            _ => None,
        })
        .filter(|line| !line.is_empty())
        .collect();

    if lines.is_empty() {
        None
    } else {
        Some(lines.join(" "))
    }
}
