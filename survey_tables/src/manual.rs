/*!

This is the long-form manual for `survey_tables` and `surveytab`.

## Input format

The export is a table with one column per survey item and one row per respondent:

* the first row holds the column identifiers (`RecordedDate`, `clubs_Participate`, ...). They are
  compared case-insensitively.
* the next row holds the full text of each question, as authored in the survey tool. It is used to
  label the rows of the tables.
* the row after that holds metadata (for example import identifiers). It is kept but not used.
* every following row is a response. The timestamp column (`recordeddate` by default) must be
  formatted as `YYYY-MM-DD HH:MM:SS`. A response with a missing or malformed timestamp stops the
  report: it could not be placed in an academic year.

Both CSV and Excel (`xlsx`) exports are supported.

## Academic years

Year `Y` covers the responses recorded from August 1 of `Y` to June 1 of `Y+1`, both included. By
default, the report covers the years from 2019 to last year. From September on (the
`year_rollover_month` option), the current year is included as well.

## Configuration

```json
{
  "datasource": "survey_data.csv",
  "year_start": 2019,
  "section_config": [
    {
      "question": "Did you participate in the following types of programs?",
      "type": "freq",
      "sub_questions": ["clubs_Participate", "rec_Participate"],
      "freq_keys": ["Yes"]
    },
    {
      "question": "How satisfied are you?",
      "type": "mean",
      "sub_questions": ["satisfaction_1", "satisfaction_2"],
      "filter": "!= 0"
    }
  ],
  "score_map": {"very satisfied": 5, "satisfied": 4, "neutral": 3}
}
```

### `freq` tables

For every sub-question and every year, the number of responses in one of the `freq_keys` (`#'yes'`)
and their percentage among the non-empty responses of that year (`%'yes'`). Several keys are
summed and shown as `#'agree or strongly agree'`. Percentages are truncated per category before
being summed.

### `mean` tables

For every sub-question and every year, the mean score of the responses, rounded to 2 decimals.
Numeric responses are their own score; other responses are scored with `score_map`. Responses
without a score are ignored. A year without any scored response shows no value.

The optional `filter` keeps only some responses. It is an operator (`==`, `!=`, `<`, `<=`, `>`,
`>=`) followed by a space and a number, compared to the score, or by a label (only with `==` and
`!=`), compared to the response itself.

### Errors in the tables

Some configuration mistakes are reported inside the report, so that the other tables are still
produced:

* a sub-question that is not a column of the export is labelled `Not Found - <identifier>` and has
  no values.
* a table with an unknown `type` is replaced by a table with a single `Error` row.

*/
