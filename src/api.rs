use crate::engine::{EventProcessor, ParseDetails, ReplaceProcessor, TagParser};
use crate::{DelimiterRules, Output};
use std::time::Duration;

/// Result from [`parse_verbose`].
#[derive(Debug, Clone)]
pub struct ParseResultVerbose {
    pub output: Output,
    /// Total elapsed time for the pass.
    pub elapsed: Duration,
    pub details: ParseDetails,
}

/// Parse `input` with the standard escape table.
///
/// Tags are offered to `replace` first and then to `events`; a tag neither
/// one handles is dropped. `context` is passed through to event callbacks.
///
/// # Example
/// ```
/// use tagwright::{Config, DelimiterRules, ReplaceRule, parse};
///
/// let mut replace: Config<ReplaceRule> = Config::new();
/// replace.add_replace_with("b", "").unwrap();
///
/// let out = parse("<b>bold</b>", DelimiterRules::angle(), &mut replace, &mut (), &mut ());
/// assert_eq!(out.visible_text, "bold");
/// ```
pub fn parse<C, R, E>(
    input: &str,
    delimiters: &DelimiterRules,
    replace: &mut R,
    events: &mut E,
    context: &mut C,
) -> Output
where
    R: ReplaceProcessor + ?Sized,
    E: EventProcessor<C> + ?Sized,
{
    TagParser::new(delimiters).parse(input, replace, events, context)
}

/// Parse `input` with replacements only. Tags without a replacement are dropped.
pub fn parse_text<R>(input: &str, delimiters: &DelimiterRules, replace: &mut R) -> Output
where
    R: ReplaceProcessor + ?Sized,
{
    TagParser::new(delimiters).parse(input, replace, &mut (), &mut ())
}

/// Like [`parse`], but also returns a trace of every tag.
///
/// The default [`parse`] path does not allocate these traces.
pub fn parse_verbose<C, R, E>(
    input: &str,
    delimiters: &DelimiterRules,
    replace: &mut R,
    events: &mut E,
    context: &mut C,
) -> ParseResultVerbose
where
    R: ReplaceProcessor + ?Sized,
    E: EventProcessor<C> + ?Sized,
{
    let (output, details) = TagParser::new(delimiters).parse_verbose(input, replace, events, context);
    ParseResultVerbose { output, elapsed: details.elapsed, details }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Config, EventId, EventRule, ReplaceRule, TagOutcome};

    #[test]
    fn parse_text_drops_unhandled_tags() {
        let mut replace: Config<ReplaceRule> = Config::new();
        replace.add_replace_with("name", "Ann").unwrap();

        let out = parse_text("<name> met <ghost>.", DelimiterRules::angle(), &mut replace);
        assert_eq!(out.rich_text, "Ann met .");
        assert_eq!(out.visible_text, "Ann met .");
        assert_eq!(out.events().count(), 0);
    }

    #[test]
    fn parse_verbose_includes_traces() {
        let mut replace: Config<ReplaceRule> = Config::new();
        replace.add_replace_with("name", "Ann").unwrap();
        let mut events: Config<EventRule<()>> = Config::new();
        events.add_event("wait").unwrap();

        let res = parse_verbose("<name><wait><nope>", DelimiterRules::angle(), &mut replace, &mut events, &mut ());

        assert_eq!(res.output.rich_text, "Ann");
        assert_eq!(res.elapsed, res.details.elapsed);
        let outcomes: Vec<&TagOutcome> = res.details.tags.iter().map(|t| &t.outcome).collect();
        assert_eq!(
            outcomes,
            vec![
                &TagOutcome::Replaced("Ann".to_string()),
                &TagOutcome::Event(EventId::new("wait")),
                &TagOutcome::Unmatched,
            ]
        );
        assert_eq!(res.details.tags[1].offset, 6);
        assert_eq!(res.details.unterminated_at, None);
    }
}
