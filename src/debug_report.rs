use tagwright::{EventData, Node, ParseResultVerbose, TagOutcome, TagTrace};

mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const DIM: &str = "\x1b[2m";
    pub const BOLD: &str = "\x1b[1m";

    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const MAGENTA: &str = "\x1b[35m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";

    pub struct Palette {
        enabled: bool,
    }

    impl Palette {
        pub fn new(enabled: bool) -> Self {
            Self { enabled }
        }

        pub fn paint(&self, s: impl AsRef<str>, color: &str) -> String {
            if self.enabled { format!("{}{}{}", color, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn bold(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", BOLD, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn dim(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", DIM, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }
    }
}

pub fn print_run(input: &str, res: &ParseResultVerbose, color: bool) {
    let palette = ansi::Palette::new(color);
    println!("\n{}", palette.bold(palette.paint(format!("⚙  Parsing: {:?}", input), ansi::CYAN)));

    println!("\n{}", palette.paint("━━━ Text ━━━", ansi::GRAY));
    println!("  {} {}", palette.dim("rich:   "), palette.paint(format!("{:?}", res.output.rich_text), ansi::GREEN));
    println!("  {} {}", palette.dim("visible:"), palette.paint(format!("{:?}", res.output.visible_text), ansi::GREEN));

    println!("\n{}", palette.paint("━━━ Nodes ━━━", ansi::GRAY));
    print_nodes(res, &palette);

    println!("\n{}", palette.paint("━━━ Tags ━━━", ansi::GRAY));
    if res.details.tags.is_empty() {
        println!("{}", palette.dim("  No tags found"));
    }
    for trace in &res.details.tags {
        println!("  {}", fmt_trace(trace, &palette));
    }
    if let Some(offset) = res.details.unterminated_at {
        println!(
            "  {} {}",
            palette.paint(format!("@{offset}"), ansi::YELLOW),
            palette.paint("unterminated tag, rest copied as text", ansi::MAGENTA)
        );
    }

    println!("\n{}", palette.paint("━━━ Summary ━━━", ansi::GRAY));
    println!(
        "  Total: {}  │  Replaced: {}  │  Events: {}  │  Unmatched: {}",
        palette.paint(format!("{:?}", res.elapsed), ansi::GREEN),
        palette.paint(res.details.replaced().to_string(), ansi::CYAN),
        palette.paint(res.details.events().to_string(), ansi::BLUE),
        palette.dim(res.details.unmatched().to_string()),
    );
    println!();
}

fn print_nodes(res: &ParseResultVerbose, palette: &ansi::Palette) {
    if res.output.nodes.is_empty() {
        println!("{}", palette.dim("  No nodes produced"));
        return;
    }

    let mut offset = 0;
    for (idx, node) in res.output.nodes.iter().enumerate() {
        let index = palette.paint(format!("[{}]", idx), ansi::GRAY);
        match node {
            Node::Text { visible_chars } => {
                println!(
                    "  {} {} {}",
                    index,
                    palette.paint("text", ansi::GREEN),
                    palette.dim(format!("{visible_chars} chars"))
                );
                offset += visible_chars;
            }
            Node::Event(event) => {
                println!(
                    "  {} {} {} {}",
                    index,
                    palette.bold(palette.paint(event_name(event), ansi::BLUE)),
                    palette.dim(format!("at {offset} │")),
                    fmt_event_args(event, palette)
                );
            }
        }
    }
}

fn event_name(event: &EventData) -> String {
    let name = event.event_type.name().unwrap_or_else(|| event.event_type.to_string());
    if event.closing { format!("/{name}") } else { name }
}

fn fmt_event_args(event: &EventData, palette: &ansi::Palette) -> String {
    format!(
        "{} {}  {} {}",
        palette.dim("string:"),
        palette.paint(format!("{:?}", event.string_arg), ansi::YELLOW),
        palette.dim("number:"),
        palette.paint(event.number_arg.to_string(), ansi::YELLOW)
    )
}

fn fmt_trace(trace: &TagTrace, palette: &ansi::Palette) -> String {
    let outcome = match &trace.outcome {
        TagOutcome::Replaced(text) => palette.paint(format!("→ {:?}", text), ansi::GREEN),
        TagOutcome::Event(id) => {
            palette.paint(format!("→ event {}", id.name().unwrap_or_else(|| id.to_string())), ansi::BLUE)
        }
        TagOutcome::Unmatched => palette.dim("✗ unmatched"),
    };
    format!(
        "{} {} {} {} {}",
        palette.paint(format!("@{}", trace.offset), ansi::YELLOW),
        palette.paint(format!("{:?}", trace.raw), ansi::CYAN),
        palette.dim(format!("id={:?} data={:?}", trace.tag.id, trace.tag.data)),
        palette.dim(format!("{:?}", trace.tag.close_state)),
        outcome
    )
}
