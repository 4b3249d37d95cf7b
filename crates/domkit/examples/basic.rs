//! Example: Basic usage of domkit

use domkit::DomTools;

fn main() -> Result<(), domkit::QueryError> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let tools = DomTools::from_html(
        r#"<body>
            <ul id="todo">
                <li class="item">write</li>
                <li class="item done">ship</li>
            </ul>
        </body>"#,
        "about:blank",
    )?;

    let items = tools.query(".item")?;
    println!("domkit v{}: {} items", domkit::VERSION, items.len());

    items.each_wrapped(|item, index| {
        println!("  {index}: {}", item.text());
    });

    tools.query("#todo")?.append("<li class=item>relax</li>")?;
    println!("after append: {} items", items.len());

    Ok(())
}
