//! Procedural macros for declaring HTTP-triggered functions.
//!
//! This crate provides the `#[http_function]` attribute macro, which turns an
//! async handler into a type the host can register and a trigger manifest
//! the binding descriptor is rendered from.
//!
//! # Example
//!
//! ```ignore
//! use hello_trigger::prelude::*;
//!
//! #[http_function(name = "Echo", auth_level = "function", methods = "POST")]
//! pub async fn echo(req: HttpRequest, _ctx: &FunctionContext) -> Result<HttpResponse, FunctionError> {
//!     Ok(HttpResponse::text(req.body_field("message").unwrap_or_default()))
//! }
//! ```

use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{parse_macro_input, punctuated::Punctuated, Expr, ExprLit, ItemFn, Lit, Meta, Token};

const AUTH_LEVELS: &[&str] = &["anonymous", "function", "admin"];
const METHODS: &[&str] = &["GET", "POST", "PUT", "DELETE", "PATCH", "HEAD", "OPTIONS"];

/// Attributes for the `#[http_function]` macro.
#[derive(Default, Debug)]
struct HttpFunctionAttrs {
    /// Function name, as the host routes to it.
    name: Option<String>,
    /// Trigger authorization level.
    auth_level: Option<String>,
    /// Comma-separated HTTP methods.
    methods: Option<String>,
    /// Custom route template.
    route: Option<String>,
}

impl HttpFunctionAttrs {
    fn parse_meta_list(metas: Punctuated<Meta, Token![,]>) -> syn::Result<Self> {
        let mut attrs = HttpFunctionAttrs::default();

        for meta in metas {
            let nv = match meta {
                Meta::NameValue(nv) => nv,
                other => {
                    return Err(syn::Error::new_spanned(other, "expected name = value"));
                }
            };

            let ident = nv
                .path
                .get_ident()
                .ok_or_else(|| syn::Error::new_spanned(&nv.path, "expected identifier"))?
                .to_string();

            let value = match &nv.value {
                Expr::Lit(ExprLit {
                    lit: Lit::Str(lit_str),
                    ..
                }) => lit_str.value(),
                _ => return Err(syn::Error::new_spanned(&nv.value, "expected string literal")),
            };

            match ident.as_str() {
                "name" => attrs.name = Some(value),
                "auth_level" => {
                    let level = value.to_ascii_lowercase();
                    if !AUTH_LEVELS.contains(&level.as_str()) {
                        return Err(syn::Error::new_spanned(
                            &nv.value,
                            format!("auth_level must be one of {}", AUTH_LEVELS.join(", ")),
                        ));
                    }
                    attrs.auth_level = Some(level);
                }
                "methods" => attrs.methods = Some(value),
                "route" => attrs.route = Some(value),
                _ => {
                    return Err(syn::Error::new_spanned(
                        nv.path,
                        format!("unknown attribute: {}", ident),
                    ));
                }
            }
        }

        Ok(attrs)
    }
}

/// Declare an HTTP-triggered function.
///
/// Applied to an `async fn(HttpRequest, &FunctionContext) -> Result<HttpResponse, FunctionError>`
/// named `foo_bar`, this generates:
///
/// - `FooBarFunction`, a unit struct implementing `HttpFunction`;
/// - `FOO_BAR_MANIFEST`, a `TriggerManifest` static, also returned from
///   `HttpFunction::manifest` so the registry can refuse unlisted methods.
///
/// # Attributes
///
/// - `name` (required): function name the host routes to
/// - `auth_level` (optional): `anonymous` (default), `function` or `admin`
/// - `methods` (optional): comma-separated methods, default `"GET,POST"`
/// - `route` (optional): custom route template
#[proc_macro_attribute]
pub fn http_function(args: TokenStream, input: TokenStream) -> TokenStream {
    let args = parse_macro_input!(args with Punctuated::<Meta, Token![,]>::parse_terminated);
    let input_fn = parse_macro_input!(input as ItemFn);

    match generate_http_function(args, input_fn) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn generate_http_function(
    args: Punctuated<Meta, Token![,]>,
    input_fn: ItemFn,
) -> syn::Result<proc_macro2::TokenStream> {
    let attrs = HttpFunctionAttrs::parse_meta_list(args)?;

    let function_name = attrs.name.ok_or_else(|| {
        syn::Error::new(
            proc_macro2::Span::call_site(),
            "missing required attribute: name",
        )
    })?;
    let auth_level = attrs.auth_level.unwrap_or_else(|| "anonymous".to_string());
    let route = attrs.route.unwrap_or_default();
    let methods = parse_methods(attrs.methods.as_deref().unwrap_or("GET,POST"))?;

    if input_fn.sig.asyncness.is_none() {
        return Err(syn::Error::new_spanned(
            &input_fn.sig,
            "http_function must be async",
        ));
    }

    let fn_name = &input_fn.sig.ident;
    let fn_vis = &input_fn.vis;
    let struct_name = format_ident!("{}Function", to_pascal_case(&fn_name.to_string()));
    let manifest_name = format_ident!("{}_MANIFEST", fn_name.to_string().to_uppercase());

    let expanded = quote! {
        /// Trigger manifest generated by `#[http_function]`.
        #fn_vis static #manifest_name: hello_trigger::function::TriggerManifest =
            hello_trigger::function::TriggerManifest {
                name: #function_name,
                auth_level: #auth_level,
                methods: &[#(#methods),*],
                route: #route,
            };

        /// Registrable wrapper generated by `#[http_function]`.
        #[derive(Debug, Default, Clone, Copy)]
        #fn_vis struct #struct_name;

        impl #struct_name {
            /// Create a new instance of the function.
            pub fn new() -> Self {
                Self
            }

            /// Get the trigger manifest.
            pub fn manifest() -> &'static hello_trigger::function::TriggerManifest {
                &#manifest_name
            }
        }

        #[hello_trigger::prelude::async_trait]
        impl hello_trigger::function::HttpFunction for #struct_name {
            async fn invoke(
                &self,
                request: hello_trigger::http::HttpRequest,
                ctx: &hello_trigger::function::FunctionContext,
            ) -> Result<hello_trigger::http::HttpResponse, hello_trigger::function::FunctionError> {
                #fn_name(request, ctx).await
            }

            fn name(&self) -> &str {
                #function_name
            }

            fn manifest(&self) -> Option<&'static hello_trigger::function::TriggerManifest> {
                Some(&#manifest_name)
            }
        }

        #input_fn
    };

    Ok(expanded)
}

/// Split and upper-case a comma-separated method list.
fn parse_methods(raw: &str) -> syn::Result<Vec<String>> {
    let methods: Vec<String> = raw
        .split(',')
        .map(|m| m.trim().to_ascii_uppercase())
        .filter(|m| !m.is_empty())
        .collect();

    if methods.is_empty() {
        return Err(syn::Error::new(
            proc_macro2::Span::call_site(),
            "methods must name at least one HTTP method",
        ));
    }
    if let Some(bad) = methods.iter().find(|m| !METHODS.contains(&m.as_str())) {
        return Err(syn::Error::new(
            proc_macro2::Span::call_site(),
            format!("unsupported HTTP method: {}", bad),
        ));
    }
    Ok(methods)
}

/// Convert a snake_case string to PascalCase.
fn to_pascal_case(s: &str) -> String {
    s.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().chain(chars).collect(),
            }
        })
        .collect()
}
