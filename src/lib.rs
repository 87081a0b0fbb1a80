//! # modmail-logs
//!
//! Renders archived mod-mail transcripts to HTML and plain text.
//!
//! Layout
//!
//!     Everything lives under [modmail]. The rendering core is a constrained markdown
//!     dialect (see [modmail::dialect]) with a platform mention token, built as the usual
//!     pipeline:
//!
//!         src/modmail
//!           ├── lexing       Upstream entity decoding and HTML escaping
//!           ├── token        Closed token kind set, token tree, static token specs
//!           ├── parsing      Block stage (line rules) then span stage (precedence matching)
//!           ├── formats      Token tree → HTML / plain text
//!           └── transcript   Log documents → full transcripts
//!
//!     Configuration, logging and errors are ambient modules next to the pipeline.
//!
//! For testing helpers, see the [testing module](modmail::testing).

pub mod modmail;
