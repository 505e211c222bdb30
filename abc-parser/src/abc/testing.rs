//! Shared fixtures for tests in this crate and its dependents

/// A complete, problem-free tune.
pub const SAMPLE_TUNE: &str = "X:1
T:The Silver Spear
R:reel
M:4/4
L:1/8
K:D
|:\"D\"FA (3AAA BAFA|\"G\"B2 {c}BA \"A\"Bcde|\"D\"fa~a2 gfed|[1\"A\"B2AF ADD2:|[2\"A\"B2AF AD!fermata!D2|]
";

/// Two tunes with a free-text paragraph between them.
pub const TWO_TUNES: &str = "%abc-2.1
% a small book

X:1
T:First
K:G
GABc d2B2|

Between the tunes.

X:2
T:Second
K:Em
[EGB]2 E>F G/A/B|
";
