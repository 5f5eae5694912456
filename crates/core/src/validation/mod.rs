//! Brazilian document and address validation.
//!
//! Field-level checks applied to intake payloads before anything reaches
//! the persistence layer.

/// The 27 Brazilian federative unit codes.
pub const BR_STATES: [&str; 27] = [
    "AC", "AL", "AP", "AM", "BA", "CE", "DF", "ES", "GO", "MA", "MT", "MS", "MG", "PA", "PB", "PR",
    "PE", "PI", "RJ", "RN", "RS", "RO", "RR", "SC", "SP", "SE", "TO",
];

/// Returns true for a valid two-letter state code.
#[must_use]
pub fn is_valid_state(code: &str) -> bool {
    BR_STATES.contains(&code)
}

/// Validates a CPF using the standard mod-11 check digits.
///
/// Accepts punctuated (`123.456.789-09`) and bare (`12345678909`) forms.
/// Sequences of a single repeated digit are rejected even though their
/// check digits are self-consistent.
#[must_use]
pub fn is_valid_cpf(cpf: &str) -> bool {
    let digits: Vec<u32> = cpf.chars().filter_map(|c| c.to_digit(10)).collect();

    if digits.len() != 11 {
        return false;
    }
    if digits.iter().all(|&d| d == digits[0]) {
        return false;
    }

    let first = cpf_check_digit(&digits[..9]);
    let second = cpf_check_digit(&digits[..10]);

    digits[9] == first && digits[10] == second
}

fn cpf_check_digit(digits: &[u32]) -> u32 {
    let weight_start = digits.len() as u32 + 1;
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, &d)| d * (weight_start - i as u32))
        .sum();

    match (sum * 10) % 11 {
        10 => 0,
        digit => digit,
    }
}

/// Validates a CEP (postal code): eight digits, optional dash.
#[must_use]
pub fn is_valid_cep(cep: &str) -> bool {
    let bare: String = cep.chars().filter(|c| *c != '-').collect();
    bare.len() == 8 && bare.chars().all(|c| c.is_ascii_digit())
}

/// Minimal email shape check: one `@` with non-empty local part and a dot
/// in the domain.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

/// Validates a CNAE activity code: seven digits, punctuation optional
/// (`5611-2/01` or `5611201`).
#[must_use]
pub fn is_valid_cnae(cnae: &str) -> bool {
    let digits: String = cnae.chars().filter(char::is_ascii_digit).collect();
    digits.len() == 7
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_cpfs() {
        // Check digits computed by the published algorithm
        assert!(is_valid_cpf("529.982.247-25"));
        assert!(is_valid_cpf("52998224725"));
        assert!(is_valid_cpf("111.444.777-35"));
    }

    #[test]
    fn test_invalid_check_digits() {
        assert!(!is_valid_cpf("529.982.247-24"));
        assert!(!is_valid_cpf("111.444.777-53"));
    }

    #[test]
    fn test_repeated_digit_cpfs_rejected() {
        for d in 0..=9 {
            let cpf: String = std::iter::repeat_n(char::from_digit(d, 10).unwrap(), 11).collect();
            assert!(!is_valid_cpf(&cpf), "{cpf} should be invalid");
        }
    }

    #[test]
    fn test_wrong_length_rejected() {
        assert!(!is_valid_cpf("1234567890"));
        assert!(!is_valid_cpf("123456789012"));
        assert!(!is_valid_cpf(""));
    }

    #[test]
    fn test_cep() {
        assert!(is_valid_cep("01234-567"));
        assert!(is_valid_cep("01234567"));
        assert!(!is_valid_cep("1234-567"));
        assert!(!is_valid_cep("abcde-fgh"));
    }

    #[test]
    fn test_state_codes() {
        assert!(is_valid_state("SP"));
        assert!(is_valid_state("TO"));
        assert!(!is_valid_state("XX"));
        assert!(!is_valid_state("sp"));
    }

    #[test]
    fn test_email_shape() {
        assert!(is_valid_email("joao@example.com"));
        assert!(!is_valid_email("joao@example"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("joao.example.com"));
        assert!(!is_valid_email("joao@.com"));
    }

    #[test]
    fn test_cnae() {
        assert!(is_valid_cnae("5611-2/01"));
        assert!(is_valid_cnae("5611201"));
        assert!(!is_valid_cnae("561120"));
    }
}
