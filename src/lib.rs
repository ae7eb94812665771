pub mod cli;
pub mod lex;
pub mod templ;
pub mod value;
