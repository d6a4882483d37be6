/// Build a `Default` value and override some of its fields, e.g.
/// `new_t!(TrainingConfig, population = 10, seed = Some(3))`
#[macro_export]
macro_rules! new_t {
    ($t:ty, $($k:ident = $v:expr),+ $(,)?) => {{
        let mut c = <$t>::default();
        $(c.$k = $v;)+
        c
    }};
}

/// Stamp out one test per listed type, with the type bound to `T` in the body
#[macro_export]
macro_rules! test_t {
  ($name:ident[T: $($impl:ty)|*]() $body:tt ) => {$(
      ::paste::paste! {
          #[test]
          fn [<test_ $name _ $impl:snake>]() {
            type T=$impl;
            $body
          }
      }
  )+};
}

#[macro_export]
macro_rules! assert_f64_approx {
    ($l:expr, $r:expr) => {
        assert!(
            ($l - $r).abs() < 1e-9,
            "assertion failed: {} !~ {}",
            $l,
            $r
        )
    };
    ($l:expr, $r:expr, $msg:expr) => {
        assert!(
            ($l - $r).abs() < 1e-9,
            "assertion failed: {} !~ {}: {}",
            $l,
            $r,
            $msg
        )
    };
}

/// Compare two point sequences coordinate by coordinate
#[macro_export]
macro_rules! assert_points_approx {
    ($l:expr, $r:expr) => {{
        let (l, r) = (&$l, &$r);
        assert_eq!(l.len(), r.len(), "point counts differ");
        for (a, b) in l.iter().zip(r.iter()) {
            $crate::assert_f64_approx!(a.x, b.x);
            $crate::assert_f64_approx!(a.y, b.y);
        }
    }};
}
