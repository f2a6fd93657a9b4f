use darling::{ast, util, Error, FromDeriveInput, FromField};
use proc_macro::TokenStream;
use proc_macro2::Ident;
use quote::quote;
use syn::{parse_macro_input, DeriveInput};

const QUERY_ATTRIBUTE_NAME: &str = "query";

type ExpandedResult<T = TokenStream, E = Error> = std::result::Result<T, E>;

#[derive(Debug, FromField)]
#[darling(attributes(query))]
struct QueryField {
    ident: Option<Ident>,
    #[darling(default)]
    name: Option<String>,
    #[darling(default)]
    flatten: bool,
}

#[derive(Debug, FromDeriveInput)]
#[darling(supports(struct_named))]
struct QueryStruct {
    ident: Ident,
    generics: syn::Generics,
    data: ast::Data<util::Ignored, QueryField>,
}

/// What the generated code does with a single field.
enum FieldStep {
    Flatten(Ident),
    Param(Ident, String),
}

#[proc_macro_derive(QueryOptions, attributes(query))]
pub fn derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match gen_query_options_impl(input) {
        Ok(token_stream) => token_stream,
        Err(err) => err.write_errors().into(),
    }
}

fn gen_query_options_impl(input: DeriveInput) -> ExpandedResult {
    let QueryStruct {
        ident: struct_name,
        generics,
        data,
    } = QueryStruct::from_derive_input(&input)?;

    let fields = data
        .take_struct()
        .ok_or_else(|| Error::unsupported_shape("enum").with_span(&struct_name))?;

    let mut errors = Vec::new();
    let mut steps = Vec::new();

    for field in fields.fields {
        match field_step(field) {
            Ok(Some(step)) => steps.push(step),
            Ok(None) => {}
            Err(err) => errors.push(err),
        }
    }

    if !errors.is_empty() {
        return Err(Error::multiple(errors));
    }

    let statements = steps.iter().map(|step| match step {
        FieldStep::Flatten(ident) => quote! {
            ::link_pager::QueryOptions::apply_query_params(&mut self.#ident, params)?;
        },
        FieldStep::Param(ident, name) => quote! {
            ::link_pager::merge_field(&mut self.#ident, #name, params)?;
        },
    });

    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::link_pager::QueryOptions for #struct_name #ty_generics #where_clause {
            fn apply_query_params(
                &mut self,
                params: &::link_pager::QueryParams,
            ) -> ::std::result::Result<(), ::link_pager::MergeError> {
                let _ = params;
                #(#statements)*
                ::std::result::Result::Ok(())
            }
        }
    }
    .into())
}

/// Maps `#[query(...)]` on a field to a merge step. Fields without the attribute are skipped.
fn field_step(field: QueryField) -> ExpandedResult<Option<FieldStep>> {
    let QueryField {
        ident,
        name,
        flatten,
    } = field;

    let ident = ident.expect("We support only named structs");

    match (name, flatten) {
        (Some(_), true) => Err(Error::custom(format_args!(
            "#[{}] accepts either `name` or `flatten`, not both",
            QUERY_ATTRIBUTE_NAME
        ))
        .with_span(&ident)),
        (None, true) => Ok(Some(FieldStep::Flatten(ident))),
        (Some(tag), false) => {
            let param = param_name(&tag);
            if param.is_empty() {
                return Err(Error::custom(format_args!(
                    "#[{}(name = \"...\")] must start with a parameter name, got \"{}\"",
                    QUERY_ATTRIBUTE_NAME, tag
                ))
                .with_span(&ident));
            }

            Ok(Some(FieldStep::Param(ident, param.to_owned())))
        }
        (None, false) => Ok(None),
    }
}

/// Only the part of a tag before the first comma names the parameter, the rest are modifiers
/// like `omitempty`.
fn param_name(tag: &str) -> &str {
    tag.split(',').next().unwrap_or_default().trim()
}
