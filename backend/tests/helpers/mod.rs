use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use dotenvy::dotenv;
use tempfile::TempDir;

use scriptorium_backend::catalog::{Catalog, DataPaths, FsSourceReader, SourceReader};
use scriptorium_backend::settings::Settings;
use scriptorium_backend::types::CatalogError;

pub const COMMANDMENTS_CSV: &str = "number,concept,polarity,reference,english,hebrew,greek,parashah,chinuch,mt_num,mt_name,mt_cat,category
1,To know there is a God,P,EXO 20:2,I am the LORD thy God,,,Yitro,25,1,Madda,Foundations,Relationship with God
2,Not to entertain thoughts of other gods besides Him,N,EXO 20:3,Thou shalt have no other gods before me,,,Yitro,26,1,Madda,Foundations,Relationship with God
3,Not to take the name of God in vain,N,EXO 20:7,Thou shalt not take the name of the LORD thy God in vain,,,Yitro,30,1,Madda,Foundations,Relationship with God
4,To honor father and mother,P,EXO 20:12,\"Honour thy father, and thy mother\",,,Yitro,33,14,Shoftim,Rebels,Family & Home
5,To circumcise all males,P,GEN 17:10,,,,Lech Lecha,2,2,Ahavah,Circumcision,Family & Home
6,To sanctify the Sabbath with words,P,EXO 20:8,Remember the sabbath day,,,Yitro,31,3,Zmanim,Shabbat,Sabbath and Festivals
7,Not to do prohibited labor on the Sabbath,N,EXO 20:10,In it thou shalt not do any work,,,Yitro,32,3,Zmanim,Shabbat,Sabbath and Festivals
8,To rest on the Sabbath,P,EXO 23:12,Six days thou shalt do thy work,,,Mishpatim,85,3,Zmanim,Shabbat,Sabbath and Festivals
oops,Broken row,P,GEN 1:1,,,,,,,,,
";

pub const TOPICS_JSON: &str = r#"{"topics": [
  {"name": "God", "slug": "god", "category": "Theology",
   "verseRefs": ["exodus-20-2", "exodus-20-3", "exodus-20-7"], "keywords": ["God", "Lord"]},
  {"name": "Sabbath", "slug": "sabbath", "category": "Worship",
   "verseRefs": ["exodus-20-8", "exodus-20-10", "exodus-23-12"], "keywords": ["rest"]},
  {"name": "Honesty", "slug": "honesty",
   "verseRefs": ["leviticus-19-11"], "keywords": ["lie", "steal"]}
]}"#;

pub const NAVES_CSV: &str = "section,subject,entry
F,FAITH,\"-Of Abraham GEN 15:6; ROM 4:3
-Exhorted ISA 7:9; MAT 17:20
-Tested REV 2:10
-See TRUST\"
L,LAW,\"GEN 26:5; EXO 20:1; LEV 18:5; NUM 15:16; DEU 4:8\"
B,BABEL,\"GEN 11:9; ISA 13:19; REV 14:8\"
T,TRUST,\"PSA 37:3; PRO 3:5; JOH 14:1; ROM 4:5\"
";

pub const HEBREW_JS: &str = r#"var strongsHebrewDictionary = {"H2":{"lemma":"אַב","xlit":"ʼab","pron":"ab","derivation":"(Aramaic) corresponding to H1","strongs_def":"{father}","kjv_def":"father."},
"H1":{"lemma":"אָב","xlit":"ʼâb","pron":"awb","derivation":"a primitive word;","strongs_def":"father","kjv_def":"chief, father, principal."}};

module.exports = strongsHebrewDictionary;"#;

pub const GREEK_JS: &str = r#"var strongsGreekDictionary = {"G26":{"lemma":"ἀγάπη","translit":"agápē","derivation":"from G25;","strongs_def":"love","kjv_def":"(feast of) charity(-ably), dear, love."},
"G25":{"lemma":"ἀγαπάω","translit":"agapáō","strongs_def":"to love","kjv_def":"(be-) love(-ed)."}};

module.exports = strongsGreekDictionary;"#;

#[allow(dead_code)]
pub fn write_file(path: &Path, text: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, text).unwrap();
}

/// A temporary data directory with every dataset in place.
pub fn fixture_dir() -> TempDir {
    dotenv().ok();
    let dir = tempfile::tempdir().unwrap();
    let paths = DataPaths::from_data_dir(dir.path());
    write_file(&paths.commandments, COMMANDMENTS_CSV);
    write_file(&paths.topics, TOPICS_JSON);
    write_file(&paths.naves, NAVES_CSV);
    write_file(&paths.strongs_hebrew, HEBREW_JS);
    write_file(&paths.strongs_greek, GREEK_JS);
    dir
}

#[allow(dead_code)]
pub fn fixture_catalog(dir: &TempDir) -> Catalog {
    Catalog::open(dir.path()).unwrap()
}

/// Counts every read that reaches the file system.
#[allow(dead_code)]
pub struct CountingReader {
    inner: FsSourceReader,
    pub reads: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl CountingReader {
    pub fn new() -> (Self, Arc<AtomicUsize>) {
        let reads = Arc::new(AtomicUsize::new(0));
        (CountingReader { inner: FsSourceReader, reads: Arc::clone(&reads) }, reads)
    }
}

impl SourceReader for CountingReader {
    fn read(&self, path: &Path) -> Result<Option<String>, CatalogError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.read(path)
    }
}

#[allow(dead_code)]
pub fn counting_catalog(dir: &TempDir, settings: Settings) -> (Catalog, Arc<AtomicUsize>) {
    let (reader, reads) = CountingReader::new();
    let catalog = Catalog::with_reader(DataPaths::from_data_dir(dir.path()), settings, Box::new(reader));
    (catalog, reads)
}
