/// Split a message into chunks that fit within Discord's message length
/// limits. Chunks are measured in characters, never split inside a char,
/// and concatenate back to the input exactly.
pub fn chunk_message(message: &str, chunk_size: usize) -> Vec<String> {
    assert!(chunk_size > 0, "chunk_size must be positive");

    if message.chars().count() <= chunk_size {
        return vec![message.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut count = 0;

    for ch in message.chars() {
        if count == chunk_size {
            chunks.push(std::mem::take(&mut current));
            count = 0;
        }
        current.push(ch);
        count += 1;
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_message_is_a_single_chunk() {
        assert_eq!(chunk_message("hello", 2000), vec!["hello"]);
        assert_eq!(chunk_message("", 2000), vec![""]);
        assert_eq!(chunk_message("abc", 3), vec!["abc"]);
    }

    #[test]
    fn chunks_respect_the_limit_and_preserve_content() {
        let message = "abcdefghij".repeat(37); // 370 chars
        for limit in [1, 7, 100, 369, 370] {
            let chunks = chunk_message(&message, limit);
            assert!(chunks.iter().all(|c| c.chars().count() <= limit));
            assert_eq!(chunks.concat(), message, "limit {limit}");
        }
    }

    #[test]
    fn never_splits_inside_a_character() {
        let message = "héllo wörld 🌦️ and some more weather".repeat(20);
        let chunks = chunk_message(&message, 10);
        assert!(chunks.iter().all(|c| c.chars().count() <= 10));
        assert_eq!(chunks.concat(), message);
    }

    #[test]
    fn exact_boundary_produces_full_chunks() {
        let chunks = chunk_message("abcdef", 2);
        assert_eq!(chunks, vec!["ab", "cd", "ef"]);
    }
}
