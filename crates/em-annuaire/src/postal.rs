use crate::constants::POSTAL_BOX_VARIANTS;

/// Postal codes worth searching for a town: the requested code followed by
/// its postal-box variants (`87200` -> `87201` ... `87209`).
///
/// Postal-box addresses conventionally share the first three digits of the
/// town's code. The prefix is read as an integer, so the input is not checked
/// for shape and leading zeros are lost (`01000` -> `1001`...). Malformed
/// input yields malformed codes rather than an error.
pub fn related_postal_codes(postal_code: &str) -> Vec<String> {
    let mut codes = vec![postal_code.to_string()];
    let base = postal_box_base(postal_code);
    for suffix in 1..=POSTAL_BOX_VARIANTS {
        let variant = format!("{base}0{suffix}");
        if variant != postal_code && !codes.contains(&variant) {
            codes.push(variant);
        }
    }
    codes
}

fn postal_box_base(postal_code: &str) -> String {
    let prefix: String = postal_code.chars().take(3).collect();
    let digits: String = prefix.chars().take_while(char::is_ascii_digit).collect();
    match digits.parse::<u32>() {
        Ok(base) => base.to_string(),
        // no digits to read; keep the raw prefix so variants stay distinguishable
        Err(_) => prefix,
    }
}

/// The department part of a postal code, used to widen a search.
pub fn department(postal_code: &str) -> &str {
    match postal_code.char_indices().nth(2) {
        Some((end, _)) => &postal_code[..end],
        None => postal_code,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_postal_box_variants() {
        assert_eq!(
            related_postal_codes("87200"),
            vec![
                "87200", "87201", "87202", "87203", "87204", "87205", "87206", "87207", "87208",
                "87209"
            ]
        );
    }

    #[test]
    fn input_that_is_itself_a_variant_is_not_repeated() {
        let codes = related_postal_codes("87205");

        assert_eq!(codes.len(), 9);
        assert_eq!(codes[0], "87205");
        assert_eq!(codes.iter().filter(|c| *c == "87205").count(), 1);
    }

    #[test]
    fn leading_zero_is_dropped_from_prefix() {
        let codes = related_postal_codes("01000");

        assert_eq!(codes[0], "01000");
        assert_eq!(codes[1], "1001");
    }

    #[test]
    fn malformed_input_does_not_panic() {
        let codes = related_postal_codes("ab");

        assert_eq!(codes[0], "ab");
        assert_eq!(codes[1], "ab01");
        assert_eq!(related_postal_codes("").len(), 10);
    }

    #[test]
    fn department_takes_two_leading_characters() {
        assert_eq!(department("87000"), "87");
        assert_eq!(department("2A004"), "2A");
        assert_eq!(department("8"), "8");
    }
}
