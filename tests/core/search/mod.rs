//! Search layer tests

mod test_query_language;
mod test_ranking;
