/// Builds a [`DxValue`](crate::DxValue) from a literal.
///
/// ```rust
/// use dx_codec::{dx, DxValue};
///
/// let user = dx!({
///     "nm": "Alice",
///     "age": 30,
///     "tags": ["rust", "llm"],
///     "cmp": ^"A",
///     "manager": null
/// });
/// let map = user.as_object().unwrap();
/// assert_eq!(map.get("cmp"), Some(&DxValue::Ref("A".to_string())));
/// assert_eq!(map.get("manager"), Some(&DxValue::Null));
/// ```
#[macro_export]
macro_rules! dx {
    // Array elements, accumulated into `[$out,]`.
    (@array [$($out:expr,)*]) => {
        vec![$($out,)*]
    };

    (@array [$($out:expr,)*] ^ $key:literal $(, $($rest:tt)*)?) => {
        $crate::dx!(@array [$($out,)* $crate::DxValue::Ref($key.to_string()),] $($($rest)*)?)
    };

    (@array [$($out:expr,)*] - $n:literal $(, $($rest:tt)*)?) => {
        $crate::dx!(@array [$($out,)* $crate::DxValue::from(-$n),] $($($rest)*)?)
    };

    (@array [$($out:expr,)*] $elem:tt $(, $($rest:tt)*)?) => {
        $crate::dx!(@array [$($out,)* $crate::dx!($elem),] $($($rest)*)?)
    };

    // Object fields, inserted into `$map` one at a time.
    (@object $map:ident) => {};

    (@object $map:ident $key:literal : ^ $r:literal $(, $($rest:tt)*)?) => {
        $map.insert($key.to_string(), $crate::DxValue::Ref($r.to_string()));
        $crate::dx!(@object $map $($($rest)*)?);
    };

    (@object $map:ident $key:literal : - $n:literal $(, $($rest:tt)*)?) => {
        $map.insert($key.to_string(), $crate::DxValue::from(-$n));
        $crate::dx!(@object $map $($($rest)*)?);
    };

    (@object $map:ident $key:literal : $value:tt $(, $($rest:tt)*)?) => {
        $map.insert($key.to_string(), $crate::dx!($value));
        $crate::dx!(@object $map $($($rest)*)?);
    };

    (null) => {
        $crate::DxValue::Null
    };

    (true) => {
        $crate::DxValue::Bool(true)
    };

    (false) => {
        $crate::DxValue::Bool(false)
    };

    (^ $key:literal) => {
        $crate::DxValue::Ref($key.to_string())
    };

    ([ $($tt:tt)* ]) => {
        $crate::DxValue::Array($crate::dx!(@array [] $($tt)*))
    };

    ({}) => {
        $crate::DxValue::Object($crate::DxMap::new())
    };

    ({ $($tt:tt)+ }) => {{
        let mut object = $crate::DxMap::new();
        $crate::dx!(@object object $($tt)+);
        $crate::DxValue::Object(object)
    }};

    ($e:expr) => {
        $crate::DxValue::from($e)
    };
}

#[cfg(test)]
mod tests {
    use crate::{DxMap, DxValue};

    #[test]
    fn test_dx_macro_primitives() {
        assert_eq!(dx!(null), DxValue::Null);
        assert_eq!(dx!(true), DxValue::Bool(true));
        assert_eq!(dx!(42), DxValue::Number(42.0));
        assert_eq!(dx!(-1.5), DxValue::Number(-1.5));
        assert_eq!(dx!("hello"), DxValue::String("hello".to_string()));
        assert_eq!(dx!(^"A"), DxValue::Ref("A".to_string()));
    }

    #[test]
    fn test_dx_macro_arrays() {
        assert_eq!(dx!([]), DxValue::Array(vec![]));
        assert_eq!(
            dx!([1, -2, [true, null], ^"A"]),
            DxValue::Array(vec![
                DxValue::Number(1.0),
                DxValue::Number(-2.0),
                DxValue::Array(vec![DxValue::Bool(true), DxValue::Null]),
                DxValue::Ref("A".to_string()),
            ])
        );
    }

    #[test]
    fn test_dx_macro_objects() {
        assert_eq!(dx!({}), DxValue::Object(DxMap::new()));
        let obj = dx!({ "nm": "Alice", "ref": ^"A", "delta": -3, "nested": { "ok": true }, });
        let map = obj.as_object().unwrap();
        assert_eq!(map.len(), 4);
        assert_eq!(map.get("delta"), Some(&DxValue::Number(-3.0)));
        assert_eq!(map.get("ref"), Some(&DxValue::Ref("A".to_string())));
    }
}
