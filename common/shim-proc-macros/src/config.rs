use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Field, Fields};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct FieldOptions {
    debug_fmt: bool,
    skip: bool,
}

fn parse_field_options(field: &Field) -> FieldOptions {
    let mut options = FieldOptions::default();

    for attr in field.attrs.iter().filter(|attr| attr.path().is_ident("cfg_display")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("debug_fmt") {
                options.debug_fmt = true;
            } else if meta.path.is_ident("skip") {
                options.skip = true;
            } else {
                return Err(meta.error("Invalid cfg_display option"));
            }

            Ok(())
        })
        .expect("Failed to parse cfg_display field attribute");
    }

    options
}

pub fn config_display(input: TokenStream) -> TokenStream {
    let ast: DeriveInput = syn::parse(input).expect("Unable to parse input");
    let name = &ast.ident;

    let Data::Struct(data) = &ast.data else {
        panic!("ConfigDisplay only applies to structs; {name} is not a struct");
    };

    let Fields::Named(fields) = &data.fields else {
        panic!("ConfigDisplay only supports structs with named fields");
    };

    let lines: Vec<_> = fields
        .named
        .iter()
        .filter_map(|field| {
            let options = parse_field_options(field);
            if options.skip {
                return None;
            }

            let ident = field.ident.as_ref()?;
            let fmt_string =
                if options.debug_fmt { format!("  {ident}: {{:?}}") } else { format!("  {ident}: {{}}") };

            Some(quote! {
                ::std::writeln!(f)?;
                ::std::write!(f, #fmt_string, self.#ident)?;
            })
        })
        .collect();

    assert!(!lines.is_empty(), "ConfigDisplay requires at least one displayed field on {name}");

    let (impl_generics, type_generics, where_clause) = ast.generics.split_for_impl();

    let expanded = quote! {
        impl #impl_generics ::std::fmt::Display for #name #type_generics #where_clause {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                #(#lines)*
                ::std::result::Result::Ok(())
            }
        }
    };

    expanded.into()
}
