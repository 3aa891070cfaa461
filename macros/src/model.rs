use darling::{ast, FromDeriveInput, FromField};
use proc_macro2::{TokenStream, TokenTree};
use quote::{format_ident, quote, ToTokens};
use syn::Meta;

#[derive(Debug, FromDeriveInput)]
#[darling(supports(struct_named), forward_attrs)]
struct ModelInputReceiver {
	ident: syn::Ident,

	generics: syn::Generics,

	data: ast::Data<(), ModelFieldReceiver>,

	attrs: Vec<syn::Attribute>,
}

#[derive(Debug, FromField)]
#[darling(forward_attrs)]
struct ModelFieldReceiver {
	ident: Option<syn::Ident>,

	ty: syn::Type,
	vis: syn::Visibility,

	attrs: Vec<syn::Attribute>,
}

/// Returns `true` for `#[serde(skip_deserializing)]` and `#[serde(skip)]`.
fn is_skipped(attr: &syn::Attribute) -> bool {
	let Meta::List(ref list) = attr.meta else {
		return false;
	};

	if !list.path.is_ident("serde") {
		return false;
	}

	list.tokens.to_token_stream().into_iter().any(|token| {
		matches!(token, TokenTree::Ident(ref ident) if ident == "skip_deserializing" || ident == "skip")
	})
}

pub fn from_input(
	args: proc_macro::TokenStream,
	input: proc_macro::TokenStream,
) -> proc_macro::TokenStream {
	let args = TokenStream::from(args);

	if !args.is_empty() {
		return syn::Error::new_spanned(args, "#[model] takes no arguments")
			.into_compile_error()
			.into();
	}

	let input = syn::parse_macro_input!(input as syn::DeriveInput);

	match expand(&input) {
		Ok(x) => x.into(),
		Err(e) => e.write_errors().into(),
	}
}

/// Emits the model unchanged, followed by its `Create{Model}Input`.
fn expand(input: &syn::DeriveInput) -> darling::Result<TokenStream> {
	let receiver = ModelInputReceiver::from_derive_input(input)?;

	let ident = &receiver.ident;
	let vis = &input.vis;
	let generics = &receiver.generics;

	// Doc comments describe the model itself, so the input gets its own.
	let attrs = receiver
		.attrs
		.iter()
		.filter(|attr| !attr.path().is_ident("doc"))
		.collect::<Vec<_>>();

	let fields = receiver
		.data
		.as_ref()
		.take_struct()
		.ok_or_else(|| darling::Error::unsupported_shape("enum"))?;

	let create_fields = fields.iter().filter_map(|field| {
		let field_ident = field.ident.as_ref()?;

		if field.attrs.iter().any(is_skipped) {
			return None;
		}

		let (attrs, ty, vis) = (&field.attrs, &field.ty, &field.vis);

		Some(quote! {
			#(#attrs)*
			#vis #field_ident: #ty,
		})
	});

	let create_ident = format_ident!("Create{}Input", ident);
	let doc = format!("The request body used to create a [`{ident}`].");

	Ok(quote! {
		#input

		#[doc = #doc]
		#(#attrs)*
		#vis struct #create_ident #generics {
			#(
				#create_fields
			)*
		}
	})
}
