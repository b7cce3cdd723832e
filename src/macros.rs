macro_rules! count {
    () => { 0usize };
    ($($a:tt, $b:tt),*) => { count!($($a),*) * 2usize };
    ($tt:tt $(, $a:tt, $b:tt)*) => { count!($($a),*) * 2usize + 1usize };
}
