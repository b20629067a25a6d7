//! Proc-macros for Refract reflection and duplication.
//!
//! # Usage
//!
//! ```ignore
//! use refract_macros::{Duplicate, Reflect, reflect_members};
//!
//! #[derive(Reflect)]
//! pub struct Human {
//!     name: String,
//!     pub(crate) age: i32,
//!     pub hobby: String,
//!     #[reflect(skip)]
//!     cache: Vec<u8>,
//! }
//!
//! #[reflect_members]
//! impl Human {
//!     pub fn new() -> Self { /* ... */ }
//!     pub fn with_profile(name: String, age: i32, hobby: String) -> Self { /* ... */ }
//!     pub fn speak(&self, message: String) { /* ... */ }
//!     fn secret(&self) -> String { /* ... */ }
//! }
//! ```
//!
//! `#[derive(Reflect)]` describes the fields and pulls constructors and methods
//! from the type's `refract_runtime::Members` impl, which `#[reflect_members]`
//! generates. Inside the impl block:
//!
//! - associated fns without a receiver that return `Self` become constructors;
//! - fns taking `&self` or `&mut self` become methods;
//! - everything else (by-value receivers, generic, async or unsafe fns, other
//!   associated fns) is left out, as is anything marked `#[reflect(skip)]`.
//!
//! Parameter, field and return types must implement `refract_runtime::ToValue`
//! (and `FromValue` where a value is taken in).

use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::{ToTokens, format_ident, quote};
use syn::{
    Attribute, Data, DeriveInput, Fields, FnArg, ImplItem, ImplItemFn, ItemImpl, Pat, ReturnType,
    Type, parse_macro_input,
};

// ============================================================================
// Helpers
// ============================================================================

/// Whether `attrs` contain `#[reflect(skip)]`.
fn is_skipped(attrs: &[Attribute]) -> syn::Result<bool> {
    let mut skip = false;
    for attr in attrs.iter().filter(|a| a.path().is_ident("reflect")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                skip = true;
                Ok(())
            } else {
                Err(meta.error("unsupported reflect attribute, expected `skip`"))
            }
        })?;
    }
    Ok(skip)
}

fn visibility_tokens(vis: &syn::Visibility) -> TokenStream2 {
    match vis {
        syn::Visibility::Public(_) => quote!(::refract_runtime::Visibility::Public),
        syn::Visibility::Restricted(restricted) => {
            let path = restricted.path.to_token_stream().to_string().replace(' ', "");
            if path == "crate" {
                quote!(::refract_runtime::Visibility::Crate)
            } else {
                quote!(::refract_runtime::Visibility::Restricted {
                    path: ::std::string::String::from(#path),
                })
            }
        }
        syn::Visibility::Inherited => quote!(::refract_runtime::Visibility::Private),
    }
}

/// The last path segment of `ty`, used to name members in error messages.
fn type_name(ty: &Type) -> syn::Result<String> {
    match ty {
        Type::Path(type_path) if type_path.qself.is_none() => type_path
            .path
            .segments
            .last()
            .map(|segment| segment.ident.to_string())
            .ok_or_else(|| syn::Error::new_spanned(ty, "expected a type path")),
        _ => Err(syn::Error::new_spanned(
            ty,
            "reflect_members requires a plain type path",
        )),
    }
}

fn returns_self(output: &ReturnType, self_ty: &Type) -> bool {
    match output {
        ReturnType::Type(_, ty) => match &**ty {
            Type::Path(type_path) if type_path.qself.is_none() => {
                type_path.path.is_ident("Self")
                    || type_path.to_token_stream().to_string()
                        == self_ty.to_token_stream().to_string()
            }
            _ => false,
        },
        ReturnType::Default => false,
    }
}

fn returns_unit(output: &ReturnType) -> bool {
    match output {
        ReturnType::Default => true,
        ReturnType::Type(_, ty) => matches!(&**ty, Type::Tuple(tuple) if tuple.elems.is_empty()),
    }
}

/// Parameter descriptors, argument bindings and types for a fn signature.
struct Params {
    infos: Vec<TokenStream2>,
    bindings: Vec<syn::Ident>,
    types: Vec<Type>,
}

fn collect_params(func: &ImplItemFn) -> Params {
    let mut params = Params {
        infos: Vec::new(),
        bindings: Vec::new(),
        types: Vec::new(),
    };

    for (index, input) in func.sig.inputs.iter().enumerate() {
        let FnArg::Typed(pat_type) = input else {
            continue;
        };
        let name = match &*pat_type.pat {
            Pat::Ident(pat_ident) => pat_ident.ident.to_string(),
            _ => format!("arg{}", index),
        };
        let ty = (*pat_type.ty).clone();

        params.infos.push(quote! {
            ::refract_runtime::ParamInfo {
                name: ::std::string::String::from(#name),
                ty: <#ty as ::refract_runtime::ToValue>::value_type(),
            }
        });
        params.bindings.push(format_ident!("__arg{}", index));
        params.types.push(ty);
    }

    params
}

// ============================================================================
// #[derive(Reflect)]
// ============================================================================

/// Implement `refract_runtime::Reflect` for a struct with named fields.
///
/// Fields can be excluded with `#[reflect(skip)]`. The type must also
/// implement `refract_runtime::Members`, normally through `#[reflect_members]`.
#[proc_macro_derive(Reflect, attributes(reflect))]
pub fn derive_reflect(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_reflect(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand_reflect(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let ident = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Reflect cannot be derived for generic types",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    ident,
                    "Reflect requires a struct with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                ident,
                "Reflect can only be derived for structs",
            ));
        }
    };

    let mut descriptors = Vec::new();
    for (index, field) in fields.iter().enumerate() {
        if is_skipped(&field.attrs)? {
            continue;
        }
        let Some(name) = &field.ident else {
            continue;
        };
        let name_str = name.to_string();
        let ty = &field.ty;
        let visibility = visibility_tokens(&field.vis);

        descriptors.push(quote! {
            ::refract_runtime::Field::new(
                ::refract_runtime::FieldInfo {
                    name: ::std::string::String::from(#name_str),
                    index: #index,
                    ty: <#ty as ::refract_runtime::ToValue>::value_type(),
                    visibility: #visibility,
                },
                |target| {
                    target
                        .downcast_ref::<#ident>()
                        .map(|this| ::refract_runtime::ToValue::to_value(&this.#name))
                },
                |target, value| {
                    let this = target.downcast_mut::<#ident>()?;
                    this.#name = <#ty as ::refract_runtime::FromValue>::from_value(value)?;
                    ::std::option::Option::Some(())
                },
            )
        });
    }

    let name_str = ident.to_string();

    Ok(quote! {
        impl ::refract_runtime::Reflect for #ident {
            fn class() -> &'static ::refract_runtime::Class {
                static CLASS: ::std::sync::OnceLock<::refract_runtime::Class> =
                    ::std::sync::OnceLock::new();
                CLASS.get_or_init(|| {
                    ::refract_runtime::Class::builder::<#ident>(#name_str, ::std::module_path!())
                        .fields(::std::vec![#(#descriptors),*])
                        .constructors(<#ident as ::refract_runtime::Members>::constructors())
                        .methods(<#ident as ::refract_runtime::Members>::methods())
                        .build()
                })
            }

            fn get_class(&self) -> &'static ::refract_runtime::Class {
                <Self as ::refract_runtime::Reflect>::class()
            }
        }
    })
}

// ============================================================================
// #[reflect_members]
// ============================================================================

/// Implement `refract_runtime::Members` from an inherent impl block.
#[proc_macro_attribute]
pub fn reflect_members(args: TokenStream, item: TokenStream) -> TokenStream {
    if !args.is_empty() {
        return syn::Error::new(Span::call_site(), "reflect_members takes no arguments")
            .into_compile_error()
            .into();
    }

    let mut item_impl = parse_macro_input!(item as ItemImpl);
    let members = expand_members(&mut item_impl).unwrap_or_else(syn::Error::into_compile_error);

    quote! {
        #item_impl
        #members
    }
    .into()
}

fn expand_members(item: &mut ItemImpl) -> syn::Result<TokenStream2> {
    if let Some((_, path, _)) = &item.trait_ {
        return Err(syn::Error::new_spanned(
            path,
            "reflect_members must be applied to an inherent impl block",
        ));
    }
    if !item.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &item.generics,
            "reflect_members does not support generic impl blocks",
        ));
    }

    let self_ty = (*item.self_ty).clone();
    let type_name = type_name(&self_ty)?;

    let mut constructors = Vec::new();
    let mut methods = Vec::new();

    for impl_item in &mut item.items {
        let ImplItem::Fn(func) = impl_item else {
            continue;
        };

        let skip = is_skipped(&func.attrs)?;
        func.attrs.retain(|attr| !attr.path().is_ident("reflect"));
        if skip
            || func.sig.asyncness.is_some()
            || func.sig.unsafety.is_some()
            || !func.sig.generics.params.is_empty()
        {
            continue;
        }

        match func.sig.receiver() {
            None if returns_self(&func.sig.output, &self_ty) => {
                constructors.push(expand_constructor(func, &self_ty, &type_name));
            }
            None => {}
            Some(receiver) => {
                if let Some(method) = expand_method(func, receiver, &self_ty, &type_name) {
                    methods.push(method);
                }
            }
        }
    }

    Ok(quote! {
        impl ::refract_runtime::Members for #self_ty {
            fn constructors() -> ::std::vec::Vec<::refract_runtime::Constructor> {
                ::std::vec![#(#constructors),*]
            }

            fn methods() -> ::std::vec::Vec<::refract_runtime::Method> {
                ::std::vec![#(#methods),*]
            }
        }
    })
}

fn expand_constructor(func: &ImplItemFn, self_ty: &Type, type_name: &str) -> TokenStream2 {
    let fn_name = &func.sig.ident;
    let name_str = fn_name.to_string();
    let member = format!("{}::{}", type_name, name_str);
    let visibility = visibility_tokens(&func.vis);
    let Params {
        infos,
        bindings,
        types,
    } = collect_params(func);

    quote! {
        ::refract_runtime::Constructor::new(
            ::refract_runtime::ConstructorInfo {
                name: ::std::string::String::from(#name_str),
                params: ::std::vec![#(#infos),*],
                visibility: #visibility,
            },
            |args| {
                #[allow(unused_mut, unused_variables)]
                let mut args = ::refract_runtime::Args::new(#member, args);
                #(let #bindings = args.next::<#types>()?;)*
                let instance: ::std::boxed::Box<dyn ::std::any::Any> =
                    ::std::boxed::Box::new(<#self_ty>::#fn_name(#(#bindings),*));
                ::std::result::Result::Ok(instance)
            },
        )
    }
}

fn expand_method(
    func: &ImplItemFn,
    receiver: &syn::Receiver,
    self_ty: &Type,
    type_name: &str,
) -> Option<TokenStream2> {
    // By-value and typed receivers (`self: Box<Self>`) cannot be called through `&mut dyn Any`
    if receiver.colon_token.is_some() {
        return None;
    }
    let receiver_kind = match (&receiver.reference, &receiver.mutability) {
        (Some(_), None) => quote!(::refract_runtime::Receiver::Ref),
        (Some(_), Some(_)) => quote!(::refract_runtime::Receiver::RefMut),
        (None, _) => return None,
    };

    let fn_name = &func.sig.ident;
    let name_str = fn_name.to_string();
    let member = format!("{}::{}", type_name, name_str);
    let visibility = visibility_tokens(&func.vis);
    let Params {
        infos,
        bindings,
        types,
    } = collect_params(func);

    let (return_ty, call) = if returns_unit(&func.sig.output) {
        (
            quote!(::std::option::Option::None),
            quote! {
                this.#fn_name(#(#bindings),*);
                ::std::result::Result::Ok(::refract_runtime::Value::Unit)
            },
        )
    } else {
        let ReturnType::Type(_, ty) = &func.sig.output else {
            return None;
        };
        (
            quote!(::std::option::Option::Some(
                <#ty as ::refract_runtime::ToValue>::value_type()
            )),
            quote! {
                let result = this.#fn_name(#(#bindings),*);
                ::std::result::Result::Ok(::refract_runtime::ToValue::to_value(&result))
            },
        )
    };

    Some(quote! {
        ::refract_runtime::Method::new(
            ::refract_runtime::MethodInfo {
                name: ::std::string::String::from(#name_str),
                receiver: #receiver_kind,
                params: ::std::vec![#(#infos),*],
                return_ty: #return_ty,
                visibility: #visibility,
            },
            |target, args| {
                let this = target.downcast_mut::<#self_ty>().ok_or_else(|| {
                    ::refract_runtime::Error::TargetMismatch {
                        expected: ::std::string::String::from(#type_name),
                    }
                })?;
                #[allow(unused_mut, unused_variables)]
                let mut args = ::refract_runtime::Args::new(#member, args);
                #(let #bindings = args.next::<#types>()?;)*
                #call
            },
        )
    })
}

// ============================================================================
// #[derive(Duplicate)]
// ============================================================================

/// Opt a struct into `refract_copy::Duplicate` by cloning every field verbatim.
///
/// No constructor runs. Fields that are shared pointers (`Rc`, `Arc`) are
/// copied as pointers, so the duplicate shares whatever they point at.
#[proc_macro_derive(Duplicate)]
pub fn derive_duplicate(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_duplicate(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand_duplicate(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let body = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => {
                let names: Vec<_> = named.named.iter().map(|f| &f.ident).collect();
                quote!(Self { #(#names: ::std::clone::Clone::clone(&self.#names)),* })
            }
            Fields::Unnamed(unnamed) => {
                let indices: Vec<_> = (0..unnamed.unnamed.len()).map(syn::Index::from).collect();
                quote!(Self(#(::std::clone::Clone::clone(&self.#indices)),*))
            }
            Fields::Unit => quote!(Self),
        },
        _ => {
            return Err(syn::Error::new_spanned(
                ident,
                "Duplicate can only be derived for structs",
            ));
        }
    };

    Ok(quote! {
        impl #impl_generics ::refract_copy::Duplicate for #ident #ty_generics #where_clause {
            fn duplicate(&self) -> ::refract_copy::Result<Self> {
                ::std::result::Result::Ok(#body)
            }
        }
    })
}
