//! `#[derive(Schema)]` for flagbind.
//!
//! Generates a `flagbind::Schema` impl that lists every named field in
//! declaration order with its tags:
//!
//! - `#[flag = "name; help"]` / `#[flag = "-"]` is the primary tag;
//! - serde's own attributes supply the fallback tag: `rename` (or
//!   `rename(deserialize = ..)`), `skip` / `skip_deserializing` (as `-`), and a
//!   container-level `rename_all`;
//! - `///` doc comments become the field's documentation.
//!
//! `#[serde(flatten)]` is rejected: flattened fields decode at the parent level
//! while their flags would be nested under the field name.
//!
//! Unit-only enums derive as a single string-valued leaf.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::ext::IdentExt;
use syn::meta::ParseNestedMeta;
use syn::{
    Attribute, Data, DataEnum, DataStruct, DeriveInput, Expr, ExprLit, Fields, Lit, LitStr, Meta,
    Token, parse_macro_input, parse_quote,
};

#[proc_macro_derive(Schema, attributes(flag, serde))]
pub fn derive_schema(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let mut generics = input.generics.clone();
    for param in generics.type_params_mut() {
        param.bounds.push(parse_quote!(::flagbind::Schema));
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let body = match &input.data {
        Data::Struct(data) => struct_kind(input, data)?,
        Data::Enum(data) => enum_kind(input, data)?,
        Data::Union(_) => {
            return Err(syn::Error::new_spanned(
                name,
                "Schema cannot be derived for unions",
            ));
        }
    };

    Ok(quote! {
        impl #impl_generics ::flagbind::Schema for #name #ty_generics #where_clause {
            fn kind() -> ::flagbind::Kind {
                #body
            }
        }
    })
}

fn struct_kind(input: &DeriveInput, data: &DataStruct) -> syn::Result<TokenStream2> {
    let Fields::Named(fields) = &data.fields else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "Schema can only be derived for structs with named fields",
        ));
    };
    let rename_all = container_rename_all(&input.attrs)?;

    let mut entries = Vec::with_capacity(fields.named.len());
    for field in &fields.named {
        let Some(ident) = &field.ident else {
            return Err(syn::Error::new_spanned(field, "expected a named field"));
        };
        let name = ident.unraw().to_string();
        let flag_tag = flag_tag(&field.attrs)?;
        let serde = serde_field(&field.attrs)?;
        let bind_tag = if serde.skip {
            Some("-".to_string())
        } else if let Some(rename) = serde.rename {
            Some(rename)
        } else {
            rename_all.map(|rule| rule.apply(&name))
        };
        let doc = doc_comment(&field.attrs);

        let flag_tag = optional_str(flag_tag.as_deref());
        let bind_tag = optional_str(bind_tag.as_deref());
        let doc = optional_str(doc.as_deref());
        let ty = &field.ty;
        entries.push(quote! {
            ::flagbind::Field {
                name: #name,
                flag_tag: #flag_tag,
                bind_tag: #bind_tag,
                doc: #doc,
                kind: <#ty as ::flagbind::Schema>::kind(),
            }
        });
    }

    Ok(quote! {
        ::flagbind::Kind::Struct(::std::vec![#(#entries),*])
    })
}

fn enum_kind(input: &DeriveInput, data: &DataEnum) -> syn::Result<TokenStream2> {
    if let Some(variant) = data
        .variants
        .iter()
        .find(|v| !matches!(v.fields, Fields::Unit))
    {
        return Err(syn::Error::new_spanned(
            variant,
            format!(
                "Schema can only be derived for enums whose variants are all unit variants ({} has data)",
                input.ident
            ),
        ));
    }
    Ok(quote! { ::flagbind::Kind::Other("enum") })
}

fn optional_str(value: Option<&str>) -> TokenStream2 {
    match value {
        Some(s) => quote!(::core::option::Option::Some(#s)),
        None => quote!(::core::option::Option::None),
    }
}

/// Value of `#[flag = "..."]`, if present.
fn flag_tag(attrs: &[Attribute]) -> syn::Result<Option<String>> {
    let mut tag = None;
    for attr in attrs.iter().filter(|a| a.path().is_ident("flag")) {
        let Meta::NameValue(nv) = &attr.meta else {
            return Err(syn::Error::new_spanned(
                attr,
                r#"expected #[flag = "name; help comment"] or #[flag = "-"]"#,
            ));
        };
        let Expr::Lit(ExprLit {
            lit: Lit::Str(s), ..
        }) = &nv.value
        else {
            return Err(syn::Error::new_spanned(
                &nv.value,
                "flag tag must be a string literal",
            ));
        };
        tag = Some(s.value());
    }
    Ok(tag)
}

#[derive(Default)]
struct SerdeField {
    rename: Option<String>,
    skip: bool,
}

fn serde_field(attrs: &[Attribute]) -> syn::Result<SerdeField> {
    let mut out = SerdeField::default();
    for attr in attrs.iter().filter(|a| a.path().is_ident("serde")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                if let Some(name) = deserialize_name(&meta)? {
                    out.rename = Some(name);
                }
            } else if meta.path.is_ident("skip") || meta.path.is_ident("skip_deserializing") {
                out.skip = true;
            } else if meta.path.is_ident("flatten") {
                return Err(meta.error(
                    "Schema does not support #[serde(flatten)]; nest the struct as a named field",
                ));
            } else {
                skip_value(&meta)?;
            }
            Ok(())
        })?;
    }
    Ok(out)
}

fn container_rename_all(attrs: &[Attribute]) -> syn::Result<Option<RenameRule>> {
    let mut rule = None;
    for attr in attrs.iter().filter(|a| a.path().is_ident("serde")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename_all") {
                if let Some(name) = deserialize_name(&meta)? {
                    rule = Some(RenameRule::from_str(&name).ok_or_else(|| {
                        meta.error(format!("unknown rename_all rule '{name}'"))
                    })?);
                }
            } else {
                skip_value(&meta)?;
            }
            Ok(())
        })?;
    }
    Ok(rule)
}

/// Read `key = "x"` or `key(deserialize = "x", ..)`.
fn deserialize_name(meta: &ParseNestedMeta) -> syn::Result<Option<String>> {
    if meta.input.peek(Token![=]) {
        let s: LitStr = meta.value()?.parse()?;
        return Ok(Some(s.value()));
    }
    let mut name = None;
    meta.parse_nested_meta(|inner| {
        let s: LitStr = inner.value()?.parse()?;
        if inner.path.is_ident("deserialize") {
            name = Some(s.value());
        }
        Ok(())
    })?;
    Ok(name)
}

/// Consume whatever follows a serde key we don't interpret.
fn skip_value(meta: &ParseNestedMeta) -> syn::Result<()> {
    if meta.input.peek(Token![=]) {
        let _: Expr = meta.value()?.parse()?;
    } else if meta.input.peek(syn::token::Paren) {
        let content;
        syn::parenthesized!(content in meta.input);
        let _: TokenStream2 = content.parse()?;
    }
    Ok(())
}

/// `///` lines joined with spaces.
fn doc_comment(attrs: &[Attribute]) -> Option<String> {
    let lines: Vec<String> = attrs
        .iter()
        .filter(|a| a.path().is_ident("doc"))
        .filter_map(|a| match &a.meta {
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

/// serde's `rename_all` rules, applied to snake_case field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RenameRule {
    Lower,
    Upper,
    Pascal,
    Camel,
    Snake,
    ScreamingSnake,
    Kebab,
    ScreamingKebab,
}

impl RenameRule {
    fn from_str(rule: &str) -> Option<Self> {
        Some(match rule {
            "lowercase" => RenameRule::Lower,
            "UPPERCASE" => RenameRule::Upper,
            "PascalCase" => RenameRule::Pascal,
            "camelCase" => RenameRule::Camel,
            "snake_case" => RenameRule::Snake,
            "SCREAMING_SNAKE_CASE" => RenameRule::ScreamingSnake,
            "kebab-case" => RenameRule::Kebab,
            "SCREAMING-KEBAB-CASE" => RenameRule::ScreamingKebab,
            _ => return None,
        })
    }

    fn apply(self, field: &str) -> String {
        match self {
            RenameRule::Lower | RenameRule::Snake => field.to_string(),
            RenameRule::Upper | RenameRule::ScreamingSnake => field.to_ascii_uppercase(),
            RenameRule::Kebab => field.replace('_', "-"),
            RenameRule::ScreamingKebab => field.replace('_', "-").to_ascii_uppercase(),
            RenameRule::Pascal => field
                .split('_')
                .map(|word| {
                    let mut chars = word.chars();
                    match chars.next() {
                        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                        None => String::new(),
                    }
                })
                .collect(),
            RenameRule::Camel => {
                let pascal = RenameRule::Pascal.apply(field);
                let mut chars = pascal.chars();
                match chars.next() {
                    Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
                    None => String::new(),
                }
            }
        }
    }
}
