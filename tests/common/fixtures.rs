// Test fixtures for integration testing

/// A page as a browser would submit it
#[allow(dead_code)] // Used in integration tests
#[derive(Debug, Clone, Copy)]
pub struct TestPage {
    pub url: &'static str,
    pub title: &'static str,
    pub body: &'static str,
}

impl TestPage {
    #[allow(dead_code)] // Used in integration tests
    pub fn html(&self) -> String {
        page_html(self.title, self.body)
    }
}

/// Minimal HTML document with a title and one paragraph
#[allow(dead_code)] // Used in integration tests
pub fn page_html(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><title>{title}</title>\
         <script>var tracking = 1;</script></head>\
         <body><p>{body}</p></body></html>"
    )
}

/// Small corpus with overlapping vocabulary
#[allow(dead_code)] // Used in integration tests
pub const CORPUS: &[TestPage] = &[
    TestPage {
        url: "https://tokio.rs/tokio/tutorial",
        title: "Tokio tutorial",
        body: "Tokio is an asynchronous runtime for the Rust programming language.",
    },
    TestPage {
        url: "https://docs.rs/serde/latest/serde/",
        title: "serde - Rust",
        body: "Serde is a framework for serializing and deserializing Rust data structures.",
    },
    TestPage {
        url: "https://spring.io/projects/spring-boot",
        title: "Spring Boot",
        body: "Spring Boot makes it easy to create Java applications with an embedded runtime.",
    },
    TestPage {
        url: "https://go.dev/doc/tutorial/getting-started",
        title: "Getting started with Go",
        body: "In this tutorial you get a brief introduction to Go programming.",
    },
    TestPage {
        url: "https://news.example.com/2024/rust-release",
        title: "Rust 1.80 released",
        body: "The Rust team announces a new release with LazyCell and exclusive ranges.",
    },
];
