use std::fmt::Write;

use proc_macro::{token_stream, Delimiter, TokenStream, TokenTree};

const KEYS: [&str; 6] = ["type", "name", "author", "description", "license", "alias"];
const REQUIRED_KEYS: [&str; 3] = ["type", "name", "license"];

#[derive(Debug, Default)]
struct ModuleInfo {
    type_: String,
    name: String,
    author: Option<String>,
    description: Option<String>,
    license: String,
    alias: Option<String>,
}

fn expect_ident(it: &mut token_stream::IntoIter) -> String {
    match it.next() {
        Some(TokenTree::Ident(ident)) => ident.to_string(),
        other => panic!("Expected Ident, found {:?}", other),
    }
}

fn expect_punct(it: &mut token_stream::IntoIter, punct: char) {
    match it.next() {
        Some(TokenTree::Punct(p)) if p.as_char() == punct => {}
        other => panic!("Expected `{}`, found {:?}", punct, other),
    }
}

/// Accepts `"text"` and `b"text"` literals without escapes.
fn expect_string(it: &mut token_stream::IntoIter) -> String {
    let literal = match it.next() {
        Some(TokenTree::Literal(literal)) => literal.to_string(),
        Some(TokenTree::Group(group)) if group.delimiter() == Delimiter::None => {
            let mut inner = group.stream().into_iter();
            return expect_string(&mut inner);
        }
        other => panic!("Expected string literal, found {:?}", other),
    };
    let literal = literal.strip_prefix('b').unwrap_or(&literal);
    let text = literal
        .strip_prefix('"')
        .and_then(|l| l.strip_suffix('"'))
        .unwrap_or_else(|| panic!("Expected string literal, found {}", literal));
    assert!(
        !text.contains('\\'),
        "Escape sequences are not supported in module metadata"
    );
    text.to_string()
}

impl ModuleInfo {
    fn parse(it: &mut token_stream::IntoIter) -> ModuleInfo {
        let mut info = ModuleInfo::default();
        let mut seen_keys = Vec::new();

        loop {
            let key = match it.next() {
                Some(TokenTree::Ident(ident)) => ident.to_string(),
                Some(other) => panic!("Expected Ident or end, found {:?}", other),
                None => break,
            };

            if seen_keys.contains(&key) {
                panic!("Duplicated key \"{}\". Keys can only be specified once.", key);
            }

            expect_punct(it, ':');

            match key.as_str() {
                "type" => info.type_ = expect_ident(it),
                "name" => info.name = expect_string(it),
                "author" => info.author = Some(expect_string(it)),
                "description" => info.description = Some(expect_string(it)),
                "license" => info.license = expect_string(it),
                "alias" => info.alias = Some(expect_string(it)),
                _ => panic!("Unknown key \"{}\". Valid keys are: {:?}.", key, KEYS),
            }

            match it.next() {
                Some(TokenTree::Punct(p)) if p.as_char() == ',' => {}
                None => {
                    seen_keys.push(key);
                    break;
                }
                other => panic!("Expected `,`, found {:?}", other),
            }

            seen_keys.push(key);
        }

        for key in REQUIRED_KEYS {
            if !seen_keys.iter().any(|e| e == key) {
                panic!("Missing required key \"{}\".", key);
            }
        }

        info
    }
}

/// Renders one `key=value` entry of the `.modinfo` section.
fn modinfo_entry(out: &mut String, key: &str, value: &str) {
    let mut bytes = format!("{}={}", key, value).into_bytes();
    bytes.push(0);
    let array = bytes
        .iter()
        .map(|b| b.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    write!(
        out,
        "
        #[doc(hidden)]
        #[link_section = \".modinfo\"]
        #[used]
        pub static __MODULE_INFO_{upper}: [u8; {len}] = [{array}];
        ",
        upper = key.to_uppercase(),
        len = bytes.len(),
        array = array,
    )
    .expect("writing to a String cannot fail");
}

pub(crate) fn module(ts: TokenStream) -> TokenStream {
    let mut it = ts.into_iter();
    let info = ModuleInfo::parse(&mut it);

    let mut modinfo = String::new();
    modinfo_entry(&mut modinfo, "license", &info.license);
    if let Some(author) = &info.author {
        modinfo_entry(&mut modinfo, "author", author);
    }
    if let Some(description) = &info.description {
        modinfo_entry(&mut modinfo, "description", description);
    }
    if let Some(alias) = &info.alias {
        modinfo_entry(&mut modinfo, "alias", alias);
    }

    format!(
        "
        /// The module name.
        ///
        /// Used by the printing macros, e.g. [`pr_info!`].
        const __LOG_PREFIX: &[u8] = b\"{name}\\0\";

        {modinfo}

        static THIS_MODULE: ::kernel::ThisModule = unsafe {{
            extern \"C\" {{
                static __this_module: ::kernel::bindings::module;
            }}
            ::kernel::ThisModule::from_ptr(::core::ptr::addr_of!(__this_module) as *mut _)
        }};

        static mut __MOD: ::core::mem::MaybeUninit<{type_}> = ::core::mem::MaybeUninit::uninit();

        #[doc(hidden)]
        #[no_mangle]
        pub extern \"C\" fn init_module() -> ::core::ffi::c_int {{
            // SAFETY: The C side calls `init_module` exactly once, when the module is
            // loaded.
            unsafe {{ __init() }}
        }}

        #[doc(hidden)]
        #[no_mangle]
        pub extern \"C\" fn cleanup_module() {{
            // SAFETY: `cleanup_module` is only called once by the C side, after a
            // successful `init_module`.
            unsafe {{ __exit() }}
        }}

        /// # Safety
        ///
        /// This function must only be called once.
        unsafe fn __init() -> ::core::ffi::c_int {{
            use ::kernel::init::PinInit;

            let initer = <{type_} as ::kernel::InPlaceModule>::init(&THIS_MODULE);
            // SAFETY: No data race, since `__MOD` can only be accessed by this module
            // and there only `__init` and `__exit` access it. These functions are only
            // called once and `__exit` cannot be called before or during `__init`.
            match unsafe {{ initer.__pinned_init(::core::ptr::addr_of_mut!(__MOD).cast()) }} {{
                Ok(()) => 0,
                Err(e) => e.to_errno(),
            }}
        }}

        /// # Safety
        ///
        /// This function must
        /// - only be called once,
        /// - be called after `__init` has been called and returned `0`.
        unsafe fn __exit() {{
            // SAFETY: No data race, since `__MOD` can only be accessed by this module
            // and there only `__init` and `__exit` access it. These functions are only
            // called once and `__init` was already called.
            unsafe {{
                ::core::ptr::drop_in_place(::core::ptr::addr_of_mut!(__MOD).cast::<{type_}>());
            }}
        }}
        ",
        name = info.name,
        type_ = info.type_,
        modinfo = modinfo,
    )
    .parse()
    .expect("Error parsing formatted string into token stream.")
}
