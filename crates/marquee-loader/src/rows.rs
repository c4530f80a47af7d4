//! Per-dataset row handling: one source record in, fact and link rows out.

use marquee_core::{
  dataset::Dataset,
  model::{Crew, Episode, Name, Principal, Rating, Title, TitleAka},
  record::Record,
  sink::{CatalogSink, CrewRole, Dimension, OwnerKey},
};

use crate::{Error, Result, report::StageReport};

/// Apply `record` to `sink`, tallying every insert into `report`.
pub(crate) fn apply<S: CatalogSink>(
  sink: &mut S,
  record: &Record<'_>,
  report: &mut StageReport,
) -> Result<()> {
  let at = at_line::<S::Error>(record.line());
  match record.dataset() {
    Dataset::Titles => {
      let title = Title::from_record(record)?;
      report.tally(sink.insert_title(&title).map_err(at)?);
      let owner = OwnerKey::Natural(&title.tconst);
      for genre in &title.genres {
        report.tally(sink.link_dimension(Dimension::Genre, owner, genre).map_err(at)?);
      }
    }
    Dataset::Names => {
      let name = Name::from_record(record)?;
      report.tally(sink.insert_name(&name).map_err(at)?);
      let owner = OwnerKey::Natural(&name.nconst);
      for profession in &name.primary_profession {
        report.tally(
          sink
            .link_dimension(Dimension::Profession, owner, profession)
            .map_err(at)?,
        );
      }
      for tconst in &name.known_for_titles {
        report.tally(sink.insert_known_for(&name.nconst, tconst).map_err(at)?);
      }
    }
    Dataset::Akas => {
      let aka = TitleAka::from_record(record)?;
      let id = sink.insert_aka(&aka).map_err(at)?;
      report.written += 1;
      let owner = OwnerKey::Surrogate(id);
      for kind in &aka.types {
        report.tally(sink.link_dimension(Dimension::AkaType, owner, kind).map_err(at)?);
      }
      for attribute in &aka.attributes {
        report.tally(
          sink
            .link_dimension(Dimension::AkaAttribute, owner, attribute)
            .map_err(at)?,
        );
      }
    }
    Dataset::Episodes => {
      let episode = Episode::from_record(record)?;
      report.tally(sink.insert_episode(&episode).map_err(at)?);
    }
    Dataset::Crew => {
      let crew = Crew::from_record(record)?;
      let credits = crew
        .directors
        .iter()
        .map(|nconst| (CrewRole::Director, nconst))
        .chain(crew.writers.iter().map(|nconst| (CrewRole::Writer, nconst)));
      for (role, nconst) in credits {
        report.tally(sink.insert_credit(role, &crew.tconst, nconst).map_err(at)?);
      }
    }
    Dataset::Principals => {
      let principal = Principal::from_record(record)?;
      report.tally(sink.insert_principal(&principal).map_err(at)?);
    }
    Dataset::Ratings => {
      let rating = Rating::from_record(record)?;
      report.tally(sink.upsert_rating(&rating).map_err(at)?);
    }
  }
  Ok(())
}

/// Wrap a sink error with the source line it was raised on.
fn at_line<E: std::error::Error + Send + Sync + 'static>(
  line: u64,
) -> impl Fn(E) -> Error + Copy {
  move |e| Error::Row { line, source: Box::new(e) }
}
