//! Default-assignment policy.
//!
//! The only automatic default assignment in the system: the first card a
//! customer ever attaches becomes the default. Every later change of the
//! default pointer is an explicit caller request.

/// Decides whether a freshly attached token should become the default,
/// given the attached-method count observed after the attach.
///
/// `count <= 1` means the customer went from zero methods to one, the
/// zero-to-one transition this policy exists for.
pub fn becomes_default(attached_count_after: usize) -> bool {
    attached_count_after <= 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_method_becomes_default() {
        assert!(becomes_default(1));
    }

    #[test]
    fn zero_count_still_assigns_default() {
        // A processor listing that lags the attach can report zero; the
        // token we just attached is still the only one.
        assert!(becomes_default(0));
    }

    #[test]
    fn later_methods_never_become_default() {
        assert!(!becomes_default(2));
        assert!(!becomes_default(3));
        assert!(!becomes_default(10));
    }
}
