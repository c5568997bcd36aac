use crate::parse_enum::EnumMeta;
use quote::quote;
use std::str::FromStr;
use syn::DeriveInput;

pub fn generate_enum(
    parsed: EnumMeta,
    input: &DeriveInput,
) -> Result<proc_macro2::TokenStream, syn::Error> {
    let name = input.ident.clone();
    let repr_type = parsed.repr_type;

    let match_arms = parsed.variants.into_iter().map(|variant| {
        let value = proc_macro2::TokenStream::from_str(&variant.discriminant.to_string()).unwrap();
        let variant_name = variant.name;

        quote! {
            #value => { Ok(Self::#variant_name) }
        }
    });

    let out = quote! {
        impl ::wire103::Wire103Write for #name {
            fn pack_to_slice_unchecked<'buf>(&self, buf: &'buf mut [u8]) -> &'buf [u8] {
                let size = (#repr_type::BITS / 8) as usize;
                let mut buf = &mut buf[0..size];

                buf.copy_from_slice(&(*self as #repr_type).to_le_bytes());

                buf
            }

            fn packed_len(&self) -> usize {
                (#repr_type::BITS / 8) as usize
            }
        }

        impl ::wire103::Wire103Read for #name {
            fn unpack_from_slice(buf: &[u8]) -> Result<Self, ::wire103::WireError> {
                let size = (#repr_type::BITS / 8) as usize;

                let raw = buf.get(0..size).map(|bytes| {
                    #repr_type::from_le_bytes(bytes.try_into().unwrap())
                }).ok_or(::wire103::WireError::ReadBufferTooShort)?;

                match raw {
                    #(#match_arms),*
                    _other => { Err(::wire103::WireError::InvalidValue) }
                }
            }
        }

        impl ::wire103::Wire103Sized for #name {
            const PACKED_LEN: usize = (#repr_type::BITS / 8) as usize;

            type Buffer = [u8; (#repr_type::BITS / 8) as usize];

            fn pack(&self) -> Self::Buffer {
                (*self as #repr_type).to_le_bytes()
            }

            fn buffer() -> Self::Buffer {
                [0u8; (#repr_type::BITS / 8) as usize]
            }
        }
    };

    Ok(out)
}
