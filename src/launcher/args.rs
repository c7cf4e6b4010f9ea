//! Positional argument vector for the worker program
//!
//! The worker program takes its parameters positionally, as text, in a fixed
//! order. This order is part of the worker invocation contract and must not be
//! reordered without versioning the worker alongside it. Booleans pass as
//! `True`/`False` and absent optionals as the literal `None`, which is what
//! the worker's parser expects.

use crate::config::RunRequest;

/// Serialize a run request into the worker program's argument vector
///
/// Order: target value, two structural-size integers, three bit-width
/// integers, generation count, the fixed-trailing-edge toggle, the three
/// constraint toggles, the optional moment reference, the optional seed.
pub fn argument_vector(request: &RunRequest) -> Vec<String> {
    vec![
        request.target_cl.to_string(),
        request.n_chord.to_string(),
        request.n_thick.to_string(),
        request.bits_chord.to_string(),
        request.bits_thick.to_string(),
        request.bits_te.to_string(),
        request.generations.to_string(),
        bool_token(request.fix_te),
        bool_token(request.constrain_thickness),
        bool_token(request.constrain_area),
        bool_token(request.constrain_moment),
        option_token(request.moment_ref),
        option_token(request.seed),
    ]
}

fn bool_token(value: bool) -> String {
    if value {
        "True".to_string()
    } else {
        "False".to_string()
    }
}

fn option_token<T: ToString>(value: Option<T>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "None".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> RunRequest {
        RunRequest {
            target_cl: 0.5,
            n_chord: 6,
            n_thick: 6,
            bits_chord: 8,
            bits_thick: 8,
            bits_te: 8,
            generations: 200,
            fix_te: true,
            constrain_thickness: true,
            constrain_area: false,
            constrain_moment: true,
            moment_ref: Some(0.1),
            seed: Some(42),
            pool_size: 4,
            report: false,
            output_folder: None,
        }
    }

    #[test]
    fn test_argument_order_is_fixed() {
        let args = argument_vector(&request());
        assert_eq!(
            args,
            vec![
                "0.5", "6", "6", "8", "8", "8", "200", "True", "True", "False", "True", "0.1",
                "42"
            ]
        );
    }

    #[test]
    fn test_absent_optionals_pass_as_none_literal() {
        let mut req = request();
        req.moment_ref = None;
        req.seed = None;
        let args = argument_vector(&req);
        assert_eq!(args[11], "None");
        assert_eq!(args[12], "None");
    }

    #[test]
    fn test_vector_length_is_stable() {
        // 13 positional tokens; the worker parser depends on this count
        assert_eq!(argument_vector(&request()).len(), 13);
    }
}
