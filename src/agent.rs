use crate::config::catalog::Catalog;
use log::info;
use std::fmt;
use std::sync::Arc;

const GREETING: &str = "Hello! Welcome to Pulse & Threads. How can I help you shop today?";
const BROWSE: &str = "You can browse all our latest items on the products page.";
const THANKS: &str = "You're welcome! Is there anything else I can help with?";
const FALLBACK: &str =
    "I'm sorry, I'm still in training. I can help with basic product searches. Try asking me to 'find blue jeans'.";

const SEARCH_TRIGGERS: [&str; 2] = ["search for", "find"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Intent {
    Greeting,
    ProductSearch,
    Browse,
    Thanks,
    Fallback,
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Intent::Greeting => "greeting",
            Intent::ProductSearch => "product_search",
            Intent::Browse => "browse",
            Intent::Thanks => "thanks",
            Intent::Fallback => "fallback",
        };
        write!(f, "{}", name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply {
    pub intent: Intent,
    pub text: String,
    /// Number of catalog hits; only set for product searches.
    pub matches: Option<usize>,
}

impl Reply {
    fn canned(intent: Intent, text: &str) -> Self {
        Self { intent, text: text.to_string(), matches: None }
    }
}

/// One entry of the decision list: the reply builder runs when the
/// lower-cased message contains any of the triggers.
pub struct Rule {
    pub intent: Intent,
    pub triggers: &'static [&'static str],
    respond: fn(&str, &Catalog) -> Reply,
}

impl Rule {
    pub fn matches(&self, message: &str) -> bool {
        self.triggers.iter().any(|t| message.contains(t))
    }
}

/// Evaluated top to bottom, first match wins. Anything unmatched gets the
/// fallback reply.
pub static RULES: [Rule; 4] = [
    Rule {
        intent: Intent::Greeting,
        triggers: &["hello", "hi"],
        respond: greeting_reply,
    },
    Rule {
        intent: Intent::ProductSearch,
        triggers: &SEARCH_TRIGGERS,
        respond: search_reply,
    },
    Rule {
        intent: Intent::Browse,
        triggers: &["products"],
        respond: browse_reply,
    },
    Rule {
        intent: Intent::Thanks,
        triggers: &["thank you", "thanks"],
        respond: thanks_reply,
    },
];

/// Strips the search trigger phrases out of an already lower-cased message.
pub fn extract_search_term(message: &str) -> String {
    SEARCH_TRIGGERS.iter()
        .fold(message.to_string(), |acc, trigger| acc.replace(trigger, ""))
        .trim()
        .to_string()
}

fn greeting_reply(_: &str, _: &Catalog) -> Reply {
    Reply::canned(Intent::Greeting, GREETING)
}

fn browse_reply(_: &str, _: &Catalog) -> Reply {
    Reply::canned(Intent::Browse, BROWSE)
}

fn thanks_reply(_: &str, _: &Catalog) -> Reply {
    Reply::canned(Intent::Thanks, THANKS)
}

fn search_reply(message: &str, catalog: &Catalog) -> Reply {
    let term = extract_search_term(message);
    let found = catalog.search(&term).len();

    let text = if found > 0 {
        format!(
            "I found {} item(s) matching '{}'. You can find them on the products page!",
            found,
            term
        )
    } else {
        format!("Sorry, I couldn't find any products matching '{}'.", term)
    };

    Reply { intent: Intent::ProductSearch, text, matches: Some(found) }
}

pub fn respond(message: &str, catalog: &Catalog) -> Reply {
    let lowered = message.to_lowercase();
    RULES.iter()
        .find(|rule| rule.matches(&lowered))
        .map(|rule| (rule.respond)(&lowered, catalog))
        .unwrap_or_else(|| Reply::canned(Intent::Fallback, FALLBACK))
}

pub fn classify(message: &str, catalog: &Catalog) -> String {
    respond(message, catalog).text
}

/// Holds the shared catalog so transports don't have to thread it through
/// every call themselves.
#[derive(Clone)]
pub struct Assistant {
    catalog: Arc<Catalog>,
}

impl Assistant {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn process_message(&self, message: &str) -> Reply {
        let reply = respond(message, &self.catalog);
        match reply.matches {
            Some(n) => info!("Classified message as {} ({} match(es))", reply.intent, n),
            None => info!("Classified message as {}", reply.intent),
        }
        reply
    }
}
