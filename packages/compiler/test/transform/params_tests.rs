/**
 * Params Key Lowering Tests
 *
 * Templates written with arbitrary key casing under `Params` must resolve
 * against case-folded parameter maps once transformed.
 */

#[path = "../util/logging.rs"]
mod logging;
#[path = "../util/parser.rs"]
mod parser;
#[path = "../util/render.rs"]
mod render;

use parser::{parse, parse_set, parse_tree};
use render::{print, Renderer};
use serde_json::{json, Value};
use tpl_compiler::{serialize, transform_tree, TemplateKind, DEFAULT_OPTIONS};

fn params_data() -> Value {
    json!({
        "NotParam": "Hi There",
        "Slice": [1, 3],
        "Params": {
            "lower": "P1L",
            "slice": [1, 3],
            "mydate": "1972-01-28"
        },
        "Pages": {
            "ByWeight": [1, 3]
        },
        "CurrentSection": {
            "Params": {
                "lower": "pcurrentsection"
            }
        },
        "Site": {
            "Params": {
                "lower": "P2L",
                "slice": [1, 3]
            },
            "Language": {
                "Params": {
                    "lower": "P22L",
                    "nested": {
                        "lower": "P22L_nested"
                    }
                }
            },
            "Data": {
                "Params": {
                    "NOLOW": "P3H"
                }
            }
        }
    })
}

const PARAMS_TEMPL: &str = r#"
{{ $page := . }}
{{ $pages := .Pages }}
{{ $pageParams := .Params }}
{{ $site := .Site }}
{{ $siteParams := .Site.Params }}
{{ $data := .Site.Data }}
{{ $notparam := .NotParam }}

PCurrentSection: {{ .CurrentSection.Params.LOWER }}
P1: {{ .Params.LOWER }}
P1_2: {{ $.Params.LOWER }}
P1_3: {{ $page.Params.LOWER }}
P1_4: {{ $pageParams.LOWER }}
P2: {{ .Site.Params.LOWER }}
P2_2: {{ $.Site.Params.LOWER }}
P2_3: {{ $site.Params.LOWER }}
P2_4: {{ $siteParams.LOWER }}
P22: {{ .Site.Language.Params.LOWER }}
P22_nested: {{ .Site.Language.Params.NESTED.LOWER }}
P3: {{ .Site.Data.Params.NOLOW }}
P3_2: {{ $.Site.Data.Params.NOLOW }}
P3_3: {{ $site.Data.Params.NOLOW }}
P3_4: {{ $data.Params.NOLOW }}
P4: {{ range $i, $e := .Site.Params.SLICE }}{{ $e }}{{ end }}
P5: {{ Echo .Params.LOWER }}
P5_2: {{ Echo $site.Params.LOWER }}
{{ if .Params.LOWER }}
IF: {{ .Params.LOWER }}
{{ end }}
{{ if .Params.NOT_EXIST }}
{{ else }}
ELSE: {{ .Params.LOWER }}
{{ end }}


{{ with .Params.LOWER }}
WITH: {{ . }}
{{ end }}


{{ range .Slice }}
RANGE: {{ . }}: {{ $.Params.LOWER }}
{{ end }}
{{ index .Slice 1 }}
{{ .NotParam }}
{{ $notparam }}


{{ $lower := .Site.Params.LOWER }}
F1: {{ printf "themes/%s-theme" .Site.Params.LOWER }}
F2: {{ Echo (printf "themes/%s-theme" $lower) }}
F3: {{ Echo (printf "themes/%s-theme" .Site.Params.LOWER) }}

PSLICE: {{ range .Params.SLICE }}PSLICE{{.}}|{{ end }}

{{ $pages := "foo" }}
{{ $pages := where $pages ".Params.toc_hide" "!=" true }}
PARAMS STRING: {{ $pages.ByWeight }}
PARAMS STRING2: {{ with $pages }}{{ .ByWeight }}{{ end }}
{{ $pages3 := where ".Params.TOC_HIDE" "!=" .Params.LOWER }}
PARAMS STRING3: {{ $pages3.ByWeight }}
{{ $first := First .Pages .Site.Params.LOWER }}
PARAMS COMPOSITE: {{ $first.ByWeight }}

PARAMS SITE GLOBAL1: {{ site.Params.LOwER }}
{{ $lower := site.Params.LOwER }}
{{ $site := site }}
PARAMS SITE GLOBAL2: {{ $lower }}
PARAMS SITE GLOBAL3: {{ $site.Params.LOWER }}
"#;

fn renderer<S: render::TemplateSource + ?Sized>(source: &S) -> Renderer<'_, S> {
    Renderer::new(source)
        .with_func("where", |args| {
            let rest: Vec<String> = args.iter().skip(2).map(print).collect();
            Ok(json!({
                "ByWeight": format!(
                    "{}:{}:[{}]",
                    print(&args[0]),
                    print(&args[1]),
                    rest.join(" ")
                )
            }))
        })
        .with_func("First", |args| Ok(args[0].clone()))
        .with_func("site", |_| Ok(json!({ "Params": { "lower": "global-site" } })))
}

fn transform_and_render(name: &str, src: &str, data: &Value) -> String {
    logging::init();
    let mut tree = parse_tree(name, src);
    transform_tree(&mut tree, TemplateKind::Ordinary).expect("transform should succeed");
    renderer(&tree).render(name, data).expect("render should succeed")
}

#[test]
fn lowers_params_keys() {
    let result = transform_and_render("foo", PARAMS_TEMPL, &params_data());

    for expected in [
        "P1: P1L",
        "P1_2: P1L",
        "P1_3: P1L",
        "P1_4: P1L",
        "P2: P2L",
        "P2_2: P2L",
        "P2_3: P2L",
        "P2_4: P2L",
        "P22: P22L",
        "P22_nested: P22L_nested",
        "P3: P3H",
        "P3_2: P3H",
        "P3_3: P3H",
        "P3_4: P3H",
        "P4: 13",
        "P5: P1L",
        "P5_2: P2L",
        "IF: P1L",
        "ELSE: P1L",
        "WITH: P1L",
        "RANGE: 3: P1L",
        "Hi There",
        "F1: themes/P2L-theme",
        "F2: themes/P2L-theme",
        "F3: themes/P2L-theme",
        "PSLICE: PSLICE1|PSLICE3|",
        "PARAMS STRING: foo:.Params.toc_hide:[!= true]",
        "PARAMS STRING2: foo:.Params.toc_hide:[!= true]",
        "PARAMS STRING3: .Params.TOC_HIDE:!=:[P1L]",
        "PARAMS COMPOSITE: [1 3]",
        "PCurrentSection: pcurrentsection",
        "PARAMS SITE GLOBAL1: global-site",
        "PARAMS SITE GLOBAL2: global-site",
        "PARAMS SITE GLOBAL3: global-site",
    ] {
        assert!(
            result.contains(expected),
            "missing {:?} in output:\n{}",
            expected,
            result
        );
    }
}

#[test]
fn leaves_untransformed_template_unresolved() {
    let tree = parse_tree("foo", "P1: {{ .Params.LOWER }}");
    let result = renderer(&tree).render("foo", &params_data()).unwrap();
    assert_eq!(result, "P1: <no value>");
}

#[test]
fn rewrites_only_segments_after_marker() {
    let mut tree = parse_tree("foo", PARAMS_TEMPL);
    transform_tree(&mut tree, TemplateKind::Ordinary).unwrap();
    let out = serialize(&tree);

    assert!(out.contains("{{.CurrentSection.Params.lower}}"));
    assert!(out.contains("{{.Site.Language.Params.nested.lower}}"));
    assert!(out.contains("{{$siteParams.lower}}"));
    assert!(out.contains("{{site.Params.lower}}"));
    assert!(out.contains("{{.Site.Data.Params.NOLOW}}"));
    assert!(out.contains("{{$data.Params.NOLOW}}"));
    assert!(out.contains("{{.NotParam}}"));
}

#[test]
fn string_literals_are_untouched() {
    let mut tree = parse_tree("foo", PARAMS_TEMPL);
    transform_tree(&mut tree, TemplateKind::Ordinary).unwrap();
    let out = serialize(&tree);

    assert!(out.contains(r#"where $pages ".Params.toc_hide" "!=" true"#));
    assert!(out.contains(r#"where ".Params.TOC_HIDE" "!=" .Params.lower"#));
}

#[test]
fn function_results_carry_no_provenance() {
    let src = r#"
{{ $time := $.Params.MyDate | ToTime }}
{{ $time = $time.AddDate 0 1 0 }}
PARAMS TIME: {{ $time.Format "2006-01-02" }}
{{ $_x :=  $.Params.MyDate | ToTime }}
PARAMS TIME2: {{ $_x.AddDate 0 1 0 }}
{{ $first := First .Pages .Site.Params.LOWER }}
{{ $first.ByWeight }}
"#;
    let mut tree = parse_tree("foo", src);
    transform_tree(&mut tree, TemplateKind::Ordinary).unwrap();
    let out = serialize(&tree);

    assert!(out.contains("{{$time := $.Params.mydate | ToTime}}"));
    assert!(out.contains("{{$time = $time.AddDate 0 1 0}}"));
    assert!(out.contains(r#"{{$time.Format "2006-01-02"}}"#));
    assert!(out.contains("{{$_x.AddDate 0 1 0}}"));
    assert!(out.contains("{{$first.ByWeight}}"));
}

#[test]
fn lowers_keys_through_variable_aliases() {
    let data = json!({
        "Params": {
            "colors": {
                "blue": "Amber",
                "pretty": {
                    "first": "Indigo"
                }
            }
        }
    });

    let src = r#"
{{$__amber_1 := .Params.Colors}}
{{$__amber_2 := $__amber_1.Blue}}
{{$__amber_3 := $__amber_1.Pretty}}
{{$__amber_4 := .Params}}

Color: {{$__amber_2}}
Blue: {{ $__amber_1.Blue}}
Pretty First1: {{ $__amber_3.First}}
Pretty First2: {{ $__amber_1.Pretty.First}}
Pretty First3: {{ $__amber_4.COLORS.PRETTY.FIRST}}
"#;

    let result = transform_and_render("foo", src, &data);

    assert!(result.contains("Color: Amber"));
    assert!(result.contains("Blue: Amber"));
    assert!(result.contains("Pretty First1: Indigo"));
    assert!(result.contains("Pretty First2: Indigo"));
    assert!(result.contains("Pretty First3: Indigo"));
}

#[test]
fn lowers_keys_in_overridden_block() {
    logging::init();
    let data = json!({ "Params": { "lower": "P1L" } });

    let master = r#"
P1: {{ .Params.LOWER }}
{{ block "main" . }}DEFAULT{{ end }}"#;
    let overlay = r#"
{{ define "main" }}
P2: {{ .Params.LOWER }}
{{ end }}"#;

    let mut set = parse_set("foo", master, TemplateKind::Ordinary);
    for define in parse("overlay", overlay).unwrap().defines {
        set.add_definition(define);
    }

    let ready = set.mark_ready(&DEFAULT_OPTIONS).expect("batch should transform");
    let result = renderer(&ready).render("foo", &data).unwrap();

    assert!(result.contains("P1: P1L"));
    assert!(result.contains("P2: P1L"));
    assert!(!result.contains("DEFAULT"));
}

#[test]
fn resolves_nested_language_params_for_any_casing() {
    let data = params_data();
    for chain in [
        ".Site.Language.Params.NESTED.LOWER",
        ".Site.Language.Params.nested.lower",
        ".Site.Language.Params.Nested.Lower",
        ".Site.Language.Params.nEsTeD.LoWeR",
    ] {
        let src = format!("{{{{ {} }}}}", chain);
        let result = transform_and_render("nested", &src, &data);
        assert_eq!(result, "P22L_nested", "chain {}", chain);
    }
}

#[test]
fn lowers_keys_in_invoked_definitions() {
    logging::init();
    let src = r#"
{{ define "params-view" }}{{ .TITLE }}/{{ $.Sub.Key }}{{ end }}
{{ template "params-view" .Params }}"#;
    let data = json!({ "Params": { "title": "T", "sub": { "key": "K" } } });

    let mut set = parse_set("page", src, TemplateKind::Ordinary);
    set.transform("page", &DEFAULT_OPTIONS).unwrap();

    let view = serialize(set.get("params-view").unwrap());
    assert_eq!(view, "{{.title}}/{{$.sub.key}}");

    let result = renderer(&set).render("page", &data).unwrap();
    assert_eq!(result.trim(), "T/K");
}
