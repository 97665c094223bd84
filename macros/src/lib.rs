use proc_macro::TokenStream;
use quote::quote;
use std::collections::HashMap;
use syn::{
    Attribute, Data, DeriveInput, Expr, Fields, Lit, Meta, Token, UnOp, ext::IdentExt,
    parse_macro_input,
};

/// Helper enum for parsed attribute values
enum MetaValue {
    Str(String),
    Expr(Expr),
    Tags(Vec<(String, String)>),
    Flag,
}

/// Derive `multiconf::Record` for a struct with named fields.
///
/// Field options go in `#[config(...)]`:
/// `default = <literal>`, `required`, `tag(key = "value", ...)`, `nested`,
/// `skip`, `rename = "..."` and `doc = "..."`. Without `doc`, the field's
/// `///` comments are used. On the struct, `#[config(name = "...")]`
/// overrides the record name.
#[proc_macro_derive(Record, attributes(config))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match generate_record(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn generate_record(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let struct_name = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "#[derive(Record)] does not support generic structs",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "#[derive(Record)] only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "#[derive(Record)] only supports structs",
            ));
        }
    };

    let record_name = parse_record_name(&input.attrs)?.unwrap_or_else(|| struct_name.to_string());

    let mut field_defs = Vec::new();
    let mut ref_arms = Vec::new();
    let mut mut_arms = Vec::new();

    for (index, field) in fields.iter().enumerate() {
        let field_name = field
            .ident
            .as_ref()
            .ok_or_else(|| syn::Error::new_spanned(field, "expected a named field"))?;
        let field_type = &field.ty;
        let config = parse_field_config(field)?;

        let name = config
            .rename
            .clone()
            .unwrap_or_else(|| field_name.unraw().to_string());
        let doc = config.doc.clone().unwrap_or_default();
        let hidden = config.skip;

        let tag_names = config.tags.iter().map(|(key, _)| key);
        let tag_values = config.tags.iter().map(|(_, value)| value);

        let shape = if config.skip {
            quote! { ::multiconf::Shape::Opaque }
        } else if config.nested {
            quote! { ::multiconf::Shape::Record(<#field_type as ::multiconf::Record>::describe) }
        } else {
            quote! { ::multiconf::Shape::Leaf(<#field_type as ::multiconf::Value>::kind) }
        };

        field_defs.push(quote! {
            ::multiconf::FieldDef {
                name: #name,
                doc: #doc,
                hidden: #hidden,
                shape: #shape,
                tags: &[#((#tag_names, #tag_values)),*],
            }
        });

        if config.skip {
            continue;
        }

        if config.nested {
            ref_arms.push(quote! {
                #index => ::std::option::Option::Some(::multiconf::Slot::Record(&self.#field_name))
            });
            mut_arms.push(quote! {
                #index => ::std::option::Option::Some(::multiconf::SlotMut::Record(&mut self.#field_name))
            });
        } else {
            ref_arms.push(quote! {
                #index => ::std::option::Option::Some(::multiconf::Slot::Value(&self.#field_name))
            });
            mut_arms.push(quote! {
                #index => ::std::option::Option::Some(::multiconf::SlotMut::Value(&mut self.#field_name))
            });
        }
    }

    Ok(quote! {
        #[automatically_derived]
        impl ::multiconf::Record for #struct_name {
            fn describe() -> &'static ::multiconf::Schema {
                static FIELDS: &[::multiconf::FieldDef] = &[#(#field_defs),*];
                static SCHEMA: ::multiconf::Schema = ::multiconf::Schema {
                    name: #record_name,
                    fields: FIELDS,
                };
                &SCHEMA
            }

            fn schema(&self) -> &'static ::multiconf::Schema {
                <Self as ::multiconf::Record>::describe()
            }

            fn field(&self, index: usize) -> ::std::option::Option<::multiconf::Slot<'_>> {
                match index {
                    #(#ref_arms,)*
                    _ => ::std::option::Option::None,
                }
            }

            fn field_mut(&mut self, index: usize) -> ::std::option::Option<::multiconf::SlotMut<'_>> {
                match index {
                    #(#mut_arms,)*
                    _ => ::std::option::Option::None,
                }
            }
        }
    })
}

#[derive(Debug, Default)]
struct FieldConfig {
    tags: Vec<(String, String)>,
    nested: bool,
    skip: bool,
    rename: Option<String>,
    doc: Option<String>,
}

/// Parse #[config(default = 6060, required, tag(k = "v"), ...)] syntax
fn parse_field_list(meta_list: &syn::MetaList) -> syn::Result<HashMap<String, MetaValue>> {
    let mut values = HashMap::new();

    meta_list.parse_nested_meta(|meta| {
        let key = meta
            .path
            .get_ident()
            .ok_or_else(|| meta.error("expected identifier"))?
            .to_string();

        let value = if key == "tag" {
            let mut tags = Vec::new();
            meta.parse_nested_meta(|tag| {
                let name = tag
                    .path
                    .get_ident()
                    .ok_or_else(|| tag.error("expected tag name"))?
                    .to_string();
                let value: syn::LitStr = tag.value()?.parse()?;
                tags.push((name, value.value()));
                Ok(())
            })?;
            MetaValue::Tags(tags)
        } else if meta.input.peek(Token![=]) {
            meta.input.parse::<Token![=]>()?;

            if key == "rename" || key == "doc" || key == "name" {
                let value: syn::LitStr = meta.input.parse()?;
                MetaValue::Str(value.value())
            } else {
                let expr: Expr = meta.input.parse()?;
                MetaValue::Expr(expr)
            }
        } else {
            MetaValue::Flag
        };

        if values.insert(key.clone(), value).is_some() {
            return Err(meta.error(format!("duplicate `{key}` option")));
        }
        Ok(())
    })?;

    Ok(values)
}

fn config_lists(attrs: &[Attribute]) -> syn::Result<Vec<(&Attribute, HashMap<String, MetaValue>)>> {
    attrs
        .iter()
        .filter(|attr| attr.path().is_ident("config"))
        .map(|attr| match &attr.meta {
            Meta::List(list) => Ok((attr, parse_field_list(list)?)),
            _ => Err(syn::Error::new_spanned(
                attr,
                "config attribute must be a list: #[config(...)]",
            )),
        })
        .collect()
}

fn parse_record_name(attrs: &[Attribute]) -> syn::Result<Option<String>> {
    let mut name = None;
    for (attr, parsed) in config_lists(attrs)? {
        for (key, value) in parsed {
            match (key.as_str(), value) {
                ("name", MetaValue::Str(s)) => name = Some(s),
                _ => {
                    return Err(syn::Error::new_spanned(
                        attr,
                        format!("unknown struct option `{key}`, expected name = \"...\""),
                    ));
                }
            }
        }
    }
    Ok(name)
}

/// Render a literal default as the text the loader will coerce
fn literal_text(expr: &Expr) -> syn::Result<String> {
    match expr {
        Expr::Lit(lit) => match &lit.lit {
            Lit::Str(s) => Ok(s.value()),
            Lit::Int(i) => Ok(i.base10_digits().to_string()),
            Lit::Float(f) => Ok(f.base10_digits().to_string()),
            Lit::Bool(b) => Ok(b.value.to_string()),
            other => Err(syn::Error::new_spanned(
                other,
                "default must be a string, integer, float or bool literal",
            )),
        },
        Expr::Unary(unary) if matches!(unary.op, UnOp::Neg(_)) => {
            Ok(format!("-{}", literal_text(&unary.expr)?))
        }
        Expr::Group(group) => literal_text(&group.expr),
        other => Err(syn::Error::new_spanned(
            other,
            "default must be a string, integer, float or bool literal",
        )),
    }
}

/// Collect `///` comments, one trimmed line each, joined by spaces
fn doc_comment(attrs: &[Attribute]) -> Option<String> {
    let lines: Vec<String> = attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            Meta::NameValue(nv) => match &nv.value {
                Expr::Lit(syn::ExprLit {
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

fn parse_field_config(field: &syn::Field) -> syn::Result<FieldConfig> {
    let mut config = FieldConfig {
        doc: doc_comment(&field.attrs),
        ..Default::default()
    };

    let mut default = None;
    let mut required = false;
    let mut explicit = Vec::new();

    for (attr, parsed) in config_lists(&field.attrs)? {
        for (key, value) in parsed {
            match (key.as_str(), value) {
                ("default", MetaValue::Expr(expr)) => default = Some(literal_text(&expr)?),
                ("required", MetaValue::Flag) => required = true,
                ("nested", MetaValue::Flag) => config.nested = true,
                ("skip", MetaValue::Flag) => config.skip = true,
                ("rename", MetaValue::Str(s)) => config.rename = Some(s),
                ("doc", MetaValue::Str(s)) => config.doc = Some(s.trim().to_string()),
                ("tag", MetaValue::Tags(tags)) => config.tags.extend(tags),
                _ => {
                    return Err(syn::Error::new_spanned(
                        attr,
                        format!(
                            "unsupported config option `{key}`, expected one of: \
                             default, required, tag(..), nested, skip, rename, doc"
                        ),
                    ));
                }
            }
            explicit.push(key);
        }
    }

    if config.skip && explicit.iter().any(|key| key != "skip") {
        return Err(syn::Error::new_spanned(
            field,
            "`skip` cannot be combined with other config options",
        ));
    }

    if config.nested && (default.is_some() || required) {
        return Err(syn::Error::new_spanned(
            field,
            "nested records cannot have `default` or `required`",
        ));
    }

    if let Some(default) = default {
        config.tags.insert(0, ("default".to_string(), default));
    }
    if required {
        config.tags.push(("required".to_string(), "true".to_string()));
    }

    Ok(config)
}
