use dry_htmlcompress_parser::{Compressor, Options};
use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::{format_ident, quote};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use syn::{LitBool, LitStr, Token, parse::Parse, parse::ParseStream, parse_macro_input};
use walkdir::WalkDir;

const TEMPLATE_EXTENSIONS: [&str; 3] = ["html", "jinja", "j2"];

fn to_const_name(s: &str) -> String {
    let mut result = String::new();
    let mut prev: Option<char> = None;
    for c in s.chars() {
        if c.is_uppercase() && prev.is_some_and(|p| p.is_lowercase() || p.is_ascii_digit()) {
            result.push('_');
        }
        if c.is_alphanumeric() {
            result.extend(c.to_uppercase());
        } else {
            result.push('_');
        }
        prev = Some(c);
    }
    if result.is_empty() || result.starts_with(|c: char| c.is_ascii_digit()) {
        result.insert(0, '_');
    }
    result
}

fn compressor(default_active: Option<&LitBool>) -> Compressor {
    match default_active {
        Some(lit) if !lit.value => Compressor::new(Options::SELECTIVE),
        _ => Compressor::new(Options::ALWAYS),
    }
}

fn manifest_path(relative: &str) -> PathBuf {
    // proc macros always run under cargo, fall back to the working directory otherwise
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_default();
    Path::new(&manifest_dir).join(relative)
}

fn generate_const(
    name: &str,
    compressed: &str,
    path_for_include: Option<&str>,
) -> proc_macro2::TokenStream {
    let const_name = format_ident!("{}", to_const_name(name));

    let include_bytes_stmt = if let Some(path_str) = path_for_include {
        quote! {
            // ensure the compiler is aware the output is linked to the source so that any changes
            // to the template file will trigger a recompilation
            const _: &[u8] = include_bytes!(#path_str);
        }
    } else {
        quote! {}
    };

    quote! {
        #include_bytes_stmt
        pub const #const_name: &str = #compressed;
    }
}

fn generate_code_for_file(
    path: &Path,
    compressor: &Compressor,
    span: Span,
) -> syn::Result<(String, proc_macro2::TokenStream)> {
    let Some(file_stem) = path.file_stem().map(|stem| stem.to_string_lossy().into_owned()) else {
        return Err(syn::Error::new(span, format!("Not a template file: {:?}", path)));
    };
    let compressed = compressor
        .compress_file(path)
        .map_err(|error| syn::Error::new(span, format!("{:?}: {}", path, error)))?;
    let path_str = path.to_string_lossy();
    let code = generate_const(&file_stem, &compressed, Some(&path_str));
    Ok((to_const_name(&file_stem), code))
}

fn is_template(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| TEMPLATE_EXTENSIONS.contains(&ext))
}

/// A string literal followed by an optional `default_active` flag
struct PathInput {
    path: LitStr,
    default_active: Option<LitBool>,
}

fn parse_default_active(input: ParseStream) -> syn::Result<Option<LitBool>> {
    if input.is_empty() {
        return Ok(None);
    }
    input.parse::<Token![,]>()?;
    if input.is_empty() {
        return Ok(None);
    }
    let flag: LitBool = input.parse()?;
    if !input.is_empty() {
        input.parse::<Token![,]>()?;
    }
    Ok(Some(flag))
}

impl Parse for PathInput {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let path: LitStr = input.parse()?;
        let default_active = parse_default_active(input)?;
        Ok(PathInput { path, default_active })
    }
}

struct StrInput {
    name: LitStr,
    content: LitStr,
    default_active: Option<LitBool>,
}

impl Parse for StrInput {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let name: LitStr = input.parse()?;
        input.parse::<Token![,]>()?;
        let content: LitStr = input.parse()?;
        let default_active = parse_default_active(input)?;
        Ok(StrInput {
            name,
            content,
            default_active,
        })
    }
}

fn expand_directory(input: PathInput) -> syn::Result<proc_macro2::TokenStream> {
    let PathInput { path: dir_lit, default_active } = input;
    let root_path = manifest_path(&dir_lit.value());

    if !root_path.is_dir() {
        return Err(syn::Error::new(
            dir_lit.span(),
            format!("Directory not found: {:?}", root_path),
        ));
    }

    let compressor = compressor(default_active.as_ref());
    let mut names = HashSet::new();
    let mut consts = Vec::new();

    for entry in WalkDir::new(&root_path).sort_by_file_name() {
        let entry = match entry {
            Ok(e) => e,
            Err(_) => continue,
        };

        let path = entry.path();
        if path.is_file() && is_template(path) {
            let (name, code) = generate_code_for_file(path, &compressor, dir_lit.span())?;
            if !names.insert(name.clone()) {
                return Err(syn::Error::new(
                    dir_lit.span(),
                    format!("Duplicate template constant {} for {:?}", name, path),
                ));
            }
            consts.push(code);
        }
    }

    Ok(quote! {
        #(#consts)*
    })
}

fn expand_file(input: PathInput) -> syn::Result<proc_macro2::TokenStream> {
    let PathInput { path: file_lit, default_active } = input;
    let path = manifest_path(&file_lit.value());

    if !path.is_file() {
        return Err(syn::Error::new(
            file_lit.span(),
            format!("File not found: {:?}", path),
        ));
    }

    let compressor = compressor(default_active.as_ref());
    let (_, code) = generate_code_for_file(&path, &compressor, file_lit.span())?;
    Ok(code)
}

fn expand_str(input: StrInput) -> syn::Result<proc_macro2::TokenStream> {
    let StrInput {
        name,
        content,
        default_active,
    } = input;
    let compressed = compressor(default_active.as_ref())
        .compress(&name.value(), &content.value())
        .map_err(|error| syn::Error::new(content.span(), error.to_string()))?;
    Ok(generate_const(&name.value(), &compressed, None))
}

/// Compresses every `.html`, `.jinja` and `.j2` file below a directory into `pub const` items
#[proc_macro]
pub fn compress_directory(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as PathInput);
    expand_directory(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Compresses one template file into a `pub const` item named after the file stem
#[proc_macro]
pub fn compress_file(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as PathInput);
    expand_file(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Compresses an inline template into a `pub const` item
#[proc_macro]
pub fn compress_str(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as StrInput);
    expand_str(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
