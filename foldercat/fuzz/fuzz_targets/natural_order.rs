#![no_main]

use foldercat::scan::natural_cmp;
use libfuzzer_sys::fuzz_target;
use std::cmp::Ordering;

fuzz_target!(|data: &[u8]| {
    let s = std::str::from_utf8(data).unwrap_or("");
    let mut names: Vec<&str> = s.split('\n').take(3).collect();
    names.resize(3, "");
    let (a, b, c) = (names[0], names[1], names[2]);

    // Must be a total order or sorting a folder listing is unspecified.
    assert_eq!(natural_cmp(a, a), Ordering::Equal);
    assert_eq!(natural_cmp(a, b), natural_cmp(b, a).reverse());
    if natural_cmp(a, b) != Ordering::Greater && natural_cmp(b, c) != Ordering::Greater {
        assert_ne!(natural_cmp(a, c), Ordering::Greater);
    }
});
