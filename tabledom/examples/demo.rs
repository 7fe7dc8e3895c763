use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};
use tabledom::{to_html, Document, Element};

fn main() {
    TermLogger::init(
        LevelFilter::Debug,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
    .expect("failed to init logger");

    let mut doc = Document::new();
    doc.insert("demo_table", Element::new("table"));

    let table = doc.get_mut("demo_table").expect("mount point registered");
    table.replace_section(
        "thead",
        Element::new("thead").child(
            Element::new("tr")
                .child(Element::with_text("th", "name"))
                .child(Element::with_text("th", "status")),
        ),
    );
    table.replace_section(
        "tbody",
        Element::new("tbody").child(
            Element::new("tr")
                .attr("data-row", "0")
                .child(Element::with_text("td", "Alice"))
                .child(Element::with_text("td", "active")),
        ),
    );

    println!("{}", to_html(table));
}
