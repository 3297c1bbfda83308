/// Builds the verification code for a display name: the first three
/// characters of every whitespace-separated token (shorter tokens are kept
/// whole), uppercased and concatenated.
pub fn verification_code(name: &str) -> String {
    name.split_whitespace()
        .flat_map(|token| token.chars().take(3))
        .flat_map(char::to_uppercase)
        .collect()
}
