//! The four pages served by grad-portal.

use super::{FieldDef, Output, OutputColumn, PageDef, Param};
use crate::form::FieldKind;

const UNDERGRAD_GPA: FieldDef = FieldDef {
    name: "undergrad_gpa",
    label: "Undergrad GPA",
    kind: FieldKind::Float,
};

const GRE_SCORE: FieldDef = FieldDef {
    name: "gre_score",
    label: "GRE Score",
    kind: FieldKind::Integer,
};

const TOEFL_SCORE: FieldDef = FieldDef {
    name: "toefl_score",
    label: "TOEFL Score",
    kind: FieldKind::Integer,
};

const WORK_EXP: FieldDef = FieldDef {
    name: "work_exp",
    label: "Work Experience (years)",
    kind: FieldKind::Integer,
};

/// GRE tolerance window, in points either side of the submitted score.
const GRE_TOLERANCE: i64 = 15;
/// TOEFL tolerance window.
const TOEFL_TOLERANCE: i64 = 10;
/// Work experience tolerance window, in years.
const WORK_EXP_TOLERANCE: i64 = 2;

const STUDENT_COLUMNS: &[OutputColumn] = &[
    OutputColumn {
        header: "Undergrad GPA",
        column: "undergrad_gpa",
    },
    OutputColumn {
        header: "GRE Score",
        column: "gre_score",
    },
    OutputColumn {
        header: "TOEFL Score",
        column: "toefl_score",
    },
    OutputColumn {
        header: "Work Experience",
        column: "work_experience",
    },
    OutputColumn {
        header: "University",
        column: "univ_name",
    },
];

// Casts keep decoding uniform whether the columns are declared NUMERIC,
// INTEGER or REAL.
macro_rules! student_join_select {
    () => {
        "SELECT CAST(s.undergrad_gpa AS DOUBLE PRECISION) AS undergrad_gpa, \
         CAST(s.gre_score AS INTEGER) AS gre_score, \
         CAST(s.toefl_score AS INTEGER) AS toefl_score, \
         CAST(s.work_experience AS DOUBLE PRECISION) AS work_experience, \
         u.univ_name AS univ_name \
         FROM student s \
         JOIN studying_in t ON s.username = t.username \
         JOIN university u ON t.univ_id = u.univ_id"
    };
}

/// Universities admitting in a given season.
pub static BASIC_SEARCH: PageDef = PageDef {
    name: "basic_search",
    route: "/basic_search",
    title: "University Search",
    allow_get: false,
    required: &[FieldDef {
        name: "admit_season",
        label: "Admit Season",
        kind: FieldKind::Text,
    }],
    optional: &[],
    sql: "SELECT univ_id, email_domain, univ_name, admit_season \
          FROM university \
          WHERE admit_season = $1",
    params: &[Param::Field("admit_season")],
    output: Output::Table {
        caption: "Here are the search results:",
        columns: &[
            OutputColumn {
                header: "Univ ID",
                column: "univ_id",
            },
            OutputColumn {
                header: "Email Domain",
                column: "email_domain",
            },
            OutputColumn {
                header: "University Name",
                column: "univ_name",
            },
            OutputColumn {
                header: "Admit Season",
                column: "admit_season",
            },
        ],
    },
};

/// Students with a higher GPA and scores near the submitted ones.
pub static ADVANCED_SEARCH: PageDef = PageDef {
    name: "advanced_search",
    route: "/advanced_search",
    title: "Student Search",
    allow_get: false,
    required: &[UNDERGRAD_GPA, GRE_SCORE, TOEFL_SCORE, WORK_EXP],
    optional: &[],
    sql: concat!(
        student_join_select!(),
        " WHERE s.undergrad_gpa > $1 \
         AND s.gre_score BETWEEN $2 AND $3 \
         AND s.toefl_score BETWEEN $4 AND $5 \
         AND s.work_experience BETWEEN $6 AND $7 \
         ORDER BY s.gre_score DESC"
    ),
    params: &[
        Param::Field("undergrad_gpa"),
        Param::Offset("gre_score", -GRE_TOLERANCE),
        Param::Offset("gre_score", GRE_TOLERANCE),
        Param::Offset("toefl_score", -TOEFL_TOLERANCE),
        Param::Offset("toefl_score", TOEFL_TOLERANCE),
        Param::Offset("work_exp", -WORK_EXP_TOLERANCE),
        Param::Offset("work_exp", WORK_EXP_TOLERANCE),
    ],
    output: Output::Table {
        caption: "Here are the search results:",
        columns: STUDENT_COLUMNS,
    },
};

/// Every student with their university.
pub static BROWSE: PageDef = PageDef {
    name: "browse",
    route: "/browse",
    title: "Browse Students",
    allow_get: true,
    required: &[],
    optional: &[],
    sql: concat!(student_join_select!(), " ORDER BY s.gre_score DESC"),
    params: &[],
    output: Output::Table {
        caption: "Here are all students:",
        columns: STUDENT_COLUMNS,
    },
};

/// Adds one student row.
pub static INSERT: PageDef = PageDef {
    name: "insert",
    route: "/insert",
    title: "Add Student",
    allow_get: false,
    required: &[
        UNDERGRAD_GPA,
        GRE_SCORE,
        TOEFL_SCORE,
        WORK_EXP,
        FieldDef {
            name: "app_term",
            label: "Application Term",
            kind: FieldKind::Text,
        },
    ],
    optional: &[
        FieldDef {
            name: "username",
            label: "Username",
            kind: FieldKind::Text,
        },
        FieldDef {
            name: "email_id",
            label: "Email",
            kind: FieldKind::Text,
        },
        FieldDef {
            name: "name",
            label: "Name",
            kind: FieldKind::Text,
        },
    ],
    // Column order: username, email, name, gpa, toefl, gre, work experience, term.
    sql: "INSERT INTO student VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    params: &[
        Param::Field("username"),
        Param::Field("email_id"),
        Param::Field("name"),
        Param::Field("undergrad_gpa"),
        Param::Field("toefl_score"),
        Param::Field("gre_score"),
        Param::Field("work_exp"),
        Param::Field("app_term"),
    ],
    output: Output::Confirmation { field: "username" },
};

/// All pages, in entry-page order.
pub static PAGES: &[&PageDef] = &[&BASIC_SEARCH, &ADVANCED_SEARCH, &BROWSE, &INSERT];
