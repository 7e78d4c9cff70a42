use proc_macro::TokenStream;
use quote::quote;

#[derive(Clone, PartialEq, Eq)]
enum FieldId {
    Named(syn::Ident),
    Index(syn::Index),
}

impl FieldId {
    fn default_name(&self) -> String {
        match self {
            Self::Named(ident) => ident.to_string(),
            Self::Index(index) => index.index.to_string(),
        }
    }
}

struct Field {
    id: FieldId,
    name: String,
    ty: syn::Type,
}

enum Fields {
    Named(Vec<Field>),
    Indexed(Vec<Field>),
    Unit,
}

impl Fields {
    fn iter(&self) -> std::slice::Iter<'_, Field> {
        match self {
            Fields::Named(fields) | Fields::Indexed(fields) => fields.iter(),
            Fields::Unit => (&[] as &[Field]).iter(),
        }
    }
}

enum Data {
    Struct(Fields),
    Enum,
}

#[derive(Default)]
struct FieldAttrs {
    skip: bool,
    rename: Option<String>,
}

impl FieldAttrs {
    fn parse(attrs: &[syn::Attribute]) -> syn::Result<Self> {
        let mut parsed = Self::default();
        for attr in attrs.iter().filter(|attr| attr.path().is_ident("reflect")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("skip") {
                    parsed.skip = true;
                    Ok(())
                } else if meta.path.is_ident("rename") {
                    let name: syn::LitStr = meta.value()?.parse()?;
                    parsed.rename = Some(name.value());
                    Ok(())
                } else {
                    Err(meta.error("expected `skip` or `rename = \"...\"`"))
                }
            })?;
        }
        Ok(parsed)
    }
}

fn create_meta_fields<'a, I: Iterator<Item = &'a syn::Field>>(
    fields: I,
    named: bool,
) -> syn::Result<Fields> {
    let mut new_fields = Vec::new();
    for (index, field) in fields.enumerate() {
        let attrs = FieldAttrs::parse(&field.attrs)?;
        if attrs.skip {
            continue;
        }

        let id = match field.ident.as_ref() {
            Some(ident) => FieldId::Named(ident.clone()),
            None => FieldId::Index(syn::Index::from(index)),
        };
        new_fields.push(Field {
            name: attrs.rename.unwrap_or_else(|| id.default_name()),
            id,
            ty: field.ty.clone(),
        });
    }

    Ok(match named {
        true => Fields::Named(new_fields),
        false => Fields::Indexed(new_fields),
    })
}

/// Methods listed in `#[reflect(methods(...))]` on the type
fn create_meta_methods(attrs: &[syn::Attribute]) -> syn::Result<Vec<syn::Ident>> {
    let mut methods = Vec::new();
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("reflect")) {
        attr.parse_nested_meta(|meta| {
            if !meta.path.is_ident("methods") {
                return Err(meta.error("expected `methods(...)`"));
            }
            meta.parse_nested_meta(|method| {
                let Some(ident) = method.path.get_ident() else {
                    return Err(method.error("expected a method name"));
                };
                methods.push(ident.clone());
                Ok(())
            })
        })?;
    }
    Ok(methods)
}

struct MetaType {
    ident: syn::Ident,
    data: Data,
    methods: Vec<syn::Ident>,
}

impl MetaType {
    fn new(input: &syn::DeriveInput) -> syn::Result<Self> {
        if !input.generics.params.is_empty() {
            return Err(syn::Error::new_spanned(
                &input.generics,
                "reflecting generic types is not supported",
            ));
        }

        let data = match &input.data {
            syn::Data::Struct(syn::DataStruct { fields, .. }) => Data::Struct(match fields {
                syn::Fields::Named(named) => create_meta_fields(named.named.iter(), true)?,
                syn::Fields::Unnamed(unnamed) => {
                    create_meta_fields(unnamed.unnamed.iter(), false)?
                }
                syn::Fields::Unit => Fields::Unit,
            }),
            syn::Data::Enum(_) => Data::Enum,
            syn::Data::Union(_) => {
                return Err(syn::Error::new_spanned(
                    &input.ident,
                    "unions are not supported",
                ))
            }
        };

        Ok(Self {
            ident: input.ident.clone(),
            data,
            methods: create_meta_methods(&input.attrs)?,
        })
    }
}

mod gen {
    use quote::quote;

    use super::{Data, FieldId, MetaType};

    fn field_tokens(id: &FieldId) -> proc_macro2::TokenStream {
        match id {
            FieldId::Named(ident) => quote! {#ident},
            FieldId::Index(index) => quote! {#index},
        }
    }

    pub fn register_properties(meta: &MetaType) -> proc_macro2::TokenStream {
        let Data::Struct(fields) = &meta.data else {
            return quote! {};
        };

        let registrations = fields.iter().map(|field| {
            let name = &field.name;
            let ty = &field.ty;
            let access = field_tokens(&field.id);
            quote! {
                registry.add_property(
                    #name,
                    ::refbind::Property::new::<Self, #ty>(
                        |owner| &owner.#access,
                        |owner| &mut owner.#access,
                    ),
                );
            }
        });
        quote! {#(#registrations)*}
    }

    pub fn register_methods(meta: &MetaType) -> proc_macro2::TokenStream {
        let registrations = meta.methods.iter().map(|method| {
            let name = method.to_string();
            quote! {
                registry.add_method(#name, Self::#method);
            }
        });
        quote! {#(#registrations)*}
    }
}

/// Describes a plain `Clone` type: owned, unqualified and its own identity
#[proc_macro_derive(TypeInfo)]
pub fn type_info_derive(input: TokenStream) -> TokenStream {
    let ast = syn::parse_macro_input!(input as syn::DeriveInput);

    if !ast.generics.params.is_empty() {
        return syn::Error::new_spanned(&ast.generics, "type info for generic types is not supported")
            .to_compile_error()
            .into();
    }
    if let syn::Data::Union(_) = ast.data {
        return syn::Error::new_spanned(&ast.ident, "unions are not supported")
            .to_compile_error()
            .into();
    }

    let ty_ident = &ast.ident;
    quote! {
        ::refbind::impl_type_info!(#ty_ident);
    }
    .into()
}

/// Registers fields as properties and `#[reflect(methods(...))]` as methods
///
/// Fields are registered in declaration order under their name (or index for tuple
/// structs); `#[reflect(skip)]` leaves one out and `#[reflect(rename = "...")]` changes
/// the name it's registered under
#[proc_macro_derive(Reflect, attributes(reflect))]
pub fn reflect_derive(input: TokenStream) -> TokenStream {
    let ast = syn::parse_macro_input!(input as syn::DeriveInput);

    let meta = match MetaType::new(&ast) {
        Ok(meta) => meta,
        Err(err) => return err.to_compile_error().into(),
    };

    let ty_ident = &meta.ident;
    let properties = gen::register_properties(&meta);
    let methods = gen::register_methods(&meta);

    quote! {
        impl ::refbind::Reflect for #ty_ident {
            #[allow(unused_variables)]
            fn register(registry: &mut ::refbind::Registry<Self>) {
                #properties
                #methods
            }

            fn registry() -> &'static ::refbind::Registry<Self> {
                ::refbind::registry!(#ty_ident)
            }
        }
    }
    .into()
}
