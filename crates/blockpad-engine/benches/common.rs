// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
#[allow(dead_code)]
pub fn generate_markdown_content(size: usize) -> String {
    let base = "# Title\n\n## Section\n\nParagraph with some content and a [[Wiki Link]].\n\n- Bullet point\n  - Nested item\n- Another item\n1. First\n2. Second\n\n```rust\nfn example() {\n    println!(\"Hello\");\n}\n```\n\n$$\ne = mc^2\n$$\n\n![](assets/diagram.png)\n";
    base.repeat(size)
}

#[allow(dead_code)]
pub fn generate_typing(words: usize) -> Vec<String> {
    let mut typed = String::new();
    let mut steps = Vec::new();
    for word in 0..words {
        for ch in format!("word{word} ").chars() {
            typed.push(ch);
            steps.push(typed.clone());
        }
    }
    steps
}
