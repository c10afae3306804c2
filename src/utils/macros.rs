/**
 * utils/macros.rs
 *
 * Various macro utils, mostly small bookkeeping helpers.
 * Everything is bundled in a single file (for now) because rust macros don't have namespaces
 *
 **/

/// Read-only access to String fields, as &str
macro_rules! make_str_getter {
    ($($field: ident), *) => {
        $(#[allow(dead_code)]
        pub fn $field(&self) -> &str {
            &self.$field
        })*
    }
}

// small convenience macro because Rust does not allow to use 'continue' inside a closure
macro_rules! unwrap_or_continue {
    ($opt: expr) => {
        {
            match $opt {
                Some(v) => v,
                None => continue,
            }
        }
    }
}
